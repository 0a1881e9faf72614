use crate::error::Result;
use scout_core::Locator;

/// Page interactions the site drivers need from one browser session.
///
/// Every element operation takes a [`Locator`] and acts on the first match.
/// `is_present` and `is_visible` answer for the page as it is right now;
/// waiting is layered on top by [`crate::Waiter`].
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL and wait for the load to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Whether an element matching the locator is in the DOM
    async fn is_present(&self, locator: &Locator) -> Result<bool>;

    /// Whether a matching element is in the DOM and rendered
    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    /// Clear an input and type a value into it
    async fn clear_and_type(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Rendered text of an element
    async fn text(&self, locator: &Locator) -> Result<String>;

    /// Attribute (or resolved DOM property) of an element
    async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>>;

    /// Release the session. Further calls fail with `SessionClosed`.
    async fn close(&self) -> Result<()>;
}
