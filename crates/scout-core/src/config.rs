//! Configuration management for barcode-scout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Everything here is static for the
//! lifetime of the process.

use crate::error::{ConfigError, ConfigResult};
use crate::sites::SitesConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/barcode-scout/config.toml` (or platform
/// equivalent), or from the file named by `SCOUT_CONFIG`. If the file
/// doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Scrape timing, retry and pool settings
    pub scraper: ScraperConfig,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Target site URLs and locators
    pub sites: SitesConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = match std::env::var_os("SCOUT_CONFIG") {
            Some(path) => return Self::load_from(Path::new(&path)),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration with environment variable overrides, then validate.
    ///
    /// Supports the following environment variables:
    /// - `SCOUT_HOST`: Override listen address
    /// - `SCOUT_PORT`: Override listen port
    /// - `SCOUT_MAX_WORKERS`: Override worker pool size
    /// - `SCOUT_HEADLESS`: Override browser headless mode (true/false)
    /// - `SCOUT_CHROME`: Path to the Chrome/Chromium executable
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SCOUT_HOST") {
            tracing::debug!("Override server.host from env: {}", host);
            self.server.host = host;
        }

        if let Ok(val) = std::env::var("SCOUT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
                tracing::debug!("Override server.port from env: {}", port);
            }
        }

        if let Ok(val) = std::env::var("SCOUT_MAX_WORKERS") {
            if let Ok(workers) = val.parse() {
                self.scraper.max_workers = workers;
                tracing::debug!("Override scraper.max_workers from env: {}", workers);
            }
        }

        if let Ok(val) = std::env::var("SCOUT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(path) = std::env::var_os("SCOUT_CHROME") {
            self.browser.chrome_executable = Some(PathBuf::from(path));
        }
    }

    /// Check values that would make the service unusable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }

        for (field, value) in [
            ("scraper.max_workers", u64::try_from(self.scraper.max_workers).unwrap_or(u64::MAX)),
            ("scraper.max_retries", u64::from(self.scraper.max_retries)),
            ("scraper.wait_secs", self.scraper.wait_secs),
            ("scraper.poll_interval_ms", self.scraper.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be at least 1"));
            }
        }

        for (field, value) in [
            ("sites.catalog.url", &self.sites.catalog.url),
            ("sites.registry.url", &self.sites.registry.url),
        ] {
            match url::Url::parse(value) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(_) => return Err(ConfigError::invalid(field, "must be an http(s) URL")),
                Err(e) => return Err(ConfigError::invalid(field, e.to_string())),
            }
        }

        Ok(())
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_error)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_error)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/barcode-scout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "barcode-scout", "barcode-scout")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8005,
        }
    }
}

/// Scrape timing, retry and pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Default element wait in seconds
    pub wait_secs: u64,
    /// Settle delay after submitting a search or opening a detail view, in seconds
    pub load_wait_secs: u64,
    /// Worker pool size, one browser session per worker
    pub max_workers: usize,
    /// Attempts per barcode and per report number
    pub max_retries: u32,
    /// Base retry delay in milliseconds; attempt `n` waits `n * delay`
    pub retry_delay_ms: u64,
    /// How long to look for the registry loading overlay, in seconds
    pub overlay_detect_secs: u64,
    /// How long to wait for the overlay to go away, in seconds
    pub overlay_clear_secs: u64,
    /// Interval between element presence checks, in milliseconds
    pub poll_interval_ms: u64,
}

impl ScraperConfig {
    /// Default element wait.
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// Settle delay.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.load_wait_secs)
    }

    /// Base retry delay.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Overlay detection window.
    #[must_use]
    pub fn overlay_detect_timeout(&self) -> Duration {
        Duration::from_secs(self.overlay_detect_secs)
    }

    /// Overlay disappearance window.
    #[must_use]
    pub fn overlay_clear_timeout(&self) -> Duration {
        Duration::from_secs(self.overlay_clear_secs)
    }

    /// Element poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            wait_secs: 10,
            load_wait_secs: 2,
            max_workers: 3,
            max_retries: 3,
            retry_delay_ms: 1000,
            overlay_detect_secs: 3,
            overlay_clear_secs: 10,
            poll_interval_ms: 250,
        }
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// DevTools request timeout in seconds
    pub request_timeout_secs: u64,
    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
    /// Give each session a randomly chosen desktop user agent
    pub randomize_user_agent: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            request_timeout_secs: 30,
            chrome_executable: None,
            extra_args: Vec::new(),
            randomize_user_agent: true,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Also write plain-text logs to this file
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,scout=debug".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::Locator;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8005);
        assert_eq!(config.scraper.wait_secs, 10);
        assert_eq!(config.scraper.load_wait_secs, 2);
        assert_eq!(config.scraper.max_workers, 3);
        assert_eq!(config.scraper.max_retries, 3);
        assert_eq!(config.scraper.retry_delay(), Duration::from_secs(1));
        assert!(config.browser.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[scraper]"));
        assert!(toml_str.contains("[sites.catalog]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.sites.catalog.url, config.sites.catalog.url);
        assert_eq!(
            parsed.sites.registry.locators.expiry_info,
            config.sites.registry.locators.expiry_info
        );
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.port = 9100;
        config.scraper.max_workers = 5;
        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.scraper.max_workers, 5);
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let result = AppConfig::load_from(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[server]\nport = \"eighty\"\n").expect("write config file");

        let err = AppConfig::load_from(&config_path).expect_err("port must be a number");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_to_creates_directories() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.browser.headless = false;
        config.save_to(&config_path).expect("save config");

        let loaded = AppConfig::load_from(&config_path).expect("load saved config");
        assert!(!loaded.browser.headless);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[server]
port = 9000

[sites.catalog.locators]
search_box = { xpath = "//input[@name='q']" }
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.sites.catalog.locators.search_box,
            Locator::xpath("//input[@name='q']")
        );
        // Untouched locators keep their defaults
        assert_eq!(
            config.sites.catalog.locators.search_button,
            Locator::class("submit")
        );
        assert_eq!(config.scraper.max_retries, 3);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = AppConfig::default();
        config.scraper.max_workers = 0;
        let err = config.validate().expect_err("zero workers is invalid");
        assert!(err.to_string().contains("scraper.max_workers"));
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let mut config = AppConfig::default();
        config.scraper.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_site_url() {
        let mut config = AppConfig::default();
        config.sites.registry.url = "not a url".to_string();
        let err = config.validate().expect_err("bad url is invalid");
        assert!(err.to_string().contains("sites.registry.url"));

        config.sites.registry.url = "ftp://example.com/search".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scraper_durations() {
        let scraper = ScraperConfig::default();
        assert_eq!(scraper.wait_timeout(), Duration::from_secs(10));
        assert_eq!(scraper.settle_delay(), Duration::from_secs(2));
        assert_eq!(scraper.overlay_detect_timeout(), Duration::from_secs(3));
        assert_eq!(scraper.overlay_clear_timeout(), Duration::from_secs(10));
    }
}
