use rand::seq::SliceRandom;
use scout_core::BrowserConfig;

/// Chrome's own user agent is kept when randomization is off.
const DESKTOP_USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.0.0",
];

const ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Identity a session presents to the sites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub user_agent: Option<String>,
    pub accept_language: String,
}

impl Fingerprint {
    /// Pick a fingerprint for a new session
    pub fn for_config(config: &BrowserConfig) -> Self {
        if config.randomize_user_agent {
            Self::randomized()
        } else {
            Self {
                user_agent: None,
                accept_language: ACCEPT_LANGUAGE.to_string(),
            }
        }
    }

    /// Random common desktop user agent
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            user_agent: DESKTOP_USER_AGENTS
                .choose(&mut rng)
                .map(|ua| (*ua).to_string()),
            accept_language: ACCEPT_LANGUAGE.to_string(),
        }
    }
}
