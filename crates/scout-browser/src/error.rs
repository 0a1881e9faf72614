use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("element {locator}: {reason}")]
    ElementError { locator: String, reason: String },

    #[error("script evaluation failed: {0}")]
    ScriptError(String),

    #[error("browser session closed")]
    SessionClosed,
}

impl BrowserError {
    /// Whether the error can clear up on its own while the page settles.
    ///
    /// Script evaluation fails while a navigation swaps the execution
    /// context; polling should keep going. Everything else is a real fault.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ScriptError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("page not found".to_string());
        assert_eq!(err.to_string(), "navigation failed: page not found");

        let err = BrowserError::ElementError {
            locator: "id=searchText".to_string(),
            reason: "detached".to_string(),
        };
        assert_eq!(err.to_string(), "element id=searchText: detached");
    }

    #[test]
    fn test_transient_errors() {
        assert!(BrowserError::ScriptError("context destroyed".to_string()).is_transient());
        assert!(!BrowserError::SessionClosed.is_transient());
        assert!(!BrowserError::ChromiumError("crashed".to_string()).is_transient());
    }
}
