use crate::actions::BrowserActions;
use crate::error::{BrowserError, Result};
use crate::fingerprint::Fingerprint;
use crate::locator::{self, Probe};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use scout_core::{BrowserConfig, Locator};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One Chromium process shared by all sessions
pub struct BrowserEngine {
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    /// Cleared when the DevTools connection ends
    connected: Arc<AtomicBool>,
    config: BrowserConfig,
}

impl BrowserEngine {
    /// Launch Chromium with the configured window and flags
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        info!("Launching browser (headless={})", config.headless);

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height)
            .request_timeout(Duration::from_secs(config.request_timeout_secs))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!(
                "--window-size={},{}",
                config.window_width, config.window_height
            ));

        // with_head means NOT headless
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        for arg in &config.extra_args {
            builder = builder.arg(arg);
        }

        let chrome_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(format!("failed to launch browser: {e}")))?;

        let connected = Arc::new(AtomicBool::new(true));
        let handler_task = {
            let connected = Arc::clone(&connected);
            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        debug!("Browser handler error: {}", e);
                    }
                }
                connected.store(false, Ordering::Release);
                warn!("Browser connection closed");
            })
        };

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handler_task)),
            connected,
            config: config.clone(),
        })
    }

    /// Open a fresh tab with its own fingerprint
    pub async fn open_session(&self) -> Result<PageSession> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::SessionClosed)?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| cdp_error(e, BrowserError::ChromiumError))?;
        drop(guard);

        let fingerprint = Fingerprint::for_config(&self.config);
        if let Some(user_agent) = &fingerprint.user_agent {
            let params = SetUserAgentOverrideParams::builder()
                .user_agent(user_agent.clone())
                .accept_language(fingerprint.accept_language.clone())
                .build()
                .map_err(BrowserError::ChromiumError)?;
            page.execute(params)
                .await
                .map_err(|e| cdp_error(e, BrowserError::ChromiumError))?;
        }

        debug!("Opened browser session ({:?})", fingerprint.user_agent);
        Ok(PageSession::new(page, Arc::clone(&self.connected)))
    }

    /// Close the browser and wait for the process to exit
    pub async fn shutdown(&self) -> Result<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        if let Err(e) = browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        browser
            .wait()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
        self.connected.store(false, Ordering::Release);

        info!("Browser shut down");
        Ok(())
    }
}

/// A single tab driven through the DevTools protocol
pub struct PageSession {
    page: Page,
    closed: AtomicBool,
    connected: Arc<AtomicBool>,
}

impl PageSession {
    fn new(page: Page, connected: Arc<AtomicBool>) -> Self {
        Self {
            page,
            closed: AtomicBool::new(false),
            connected,
        }
    }

    fn page(&self) -> Result<&Page> {
        if self.closed.load(Ordering::Acquire) || !self.connected.load(Ordering::Acquire) {
            Err(BrowserError::SessionClosed)
        } else {
            Ok(&self.page)
        }
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page()?
            .evaluate_expression(script)
            .await
            .map_err(|e| cdp_error(e, BrowserError::ScriptError))?
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    async fn probe(&self, script: String) -> Result<Probe> {
        let encoded: String = self.eval(script).await?;
        serde_json::from_str(&encoded).map_err(|e| BrowserError::ScriptError(e.to_string()))
    }

    async fn element(&self, locator: &Locator) -> Result<chromiumoxide::Element> {
        self.page()?
            .find_xpath(locator::to_xpath(locator))
            .await
            .map_err(|e| element_error(locator, e))
    }
}

/// Map a DevTools failure, treating a lost connection as a dead session.
///
/// `ChannelSendError`, `Ws` and `NoResponse` only happen once the handler
/// or the websocket is gone; retrying on the same browser cannot help.
fn cdp_error(err: CdpError, wrap: impl FnOnce(String) -> BrowserError) -> BrowserError {
    match err {
        CdpError::ChannelSendError(_) | CdpError::Ws(_) | CdpError::NoResponse => {
            BrowserError::SessionClosed
        }
        other => wrap(other.to_string()),
    }
}

fn element_error(locator: &Locator, err: CdpError) -> BrowserError {
    cdp_error(err, |reason| missing_element(locator, reason))
}

fn missing_element(locator: &Locator, reason: impl Into<String>) -> BrowserError {
    BrowserError::ElementError {
        locator: locator.to_string(),
        reason: reason.into(),
    }
}

/// Only http(s) targets are loaded; anything else is a config mistake.
fn web_url(raw: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| BrowserError::NavigationError(format!("{raw}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(BrowserError::NavigationError(format!(
            "{raw}: unsupported scheme {other}"
        ))),
    }
}

#[async_trait::async_trait]
impl BrowserActions for PageSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        let target = web_url(url)?;
        debug!("Navigating to {}", target);

        self.page()?
            .goto(target.as_str())
            .await
            .map_err(|e| {
                cdp_error(e, |reason| {
                    BrowserError::NavigationError(format!("{url}: {reason}"))
                })
            })?;
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        self.eval(locator::presence_script(locator)).await
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        self.eval(locator::visibility_script(locator)).await
    }

    async fn clear_and_type(&self, locator: &Locator, value: &str) -> Result<()> {
        let element = self.element(locator).await?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(|e| element_error(locator, e))?;
        element
            .focus()
            .await
            .map_err(|e| element_error(locator, e))?
            .type_str(value)
            .await
            .map_err(|e| element_error(locator, e))?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.element(locator)
            .await?
            .click()
            .await
            .map_err(|e| element_error(locator, e))?;
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> Result<String> {
        let probe = self.probe(locator::text_script(locator)).await?;
        if !probe.found {
            return Err(missing_element(locator, "not found"));
        }
        Ok(probe.value.unwrap_or_default())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let probe = self.probe(locator::attribute_script(locator, name)).await?;
        if !probe.found {
            return Err(missing_element(locator, "not found"));
        }
        Ok(probe.value)
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| cdp_error(e, BrowserError::ChromiumError))
    }
}
