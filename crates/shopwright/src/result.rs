//! Result and error types for Shopwright.

use thiserror::Error;

/// Result type for Shopwright operations
pub type ShopResult<T> = Result<T, ShopError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ShopError {
    /// A wait or navigation exceeded its deadline
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for (usually a selector)
        what: String,
    },

    /// Selector matched nothing
    #[error("No element matches {selector}")]
    NotFound {
        /// Selector that failed to resolve
        selector: String,
    },

    /// Node left the DOM mid-operation
    #[error("Element {selector} was detached from the page")]
    Detached {
        /// Selector of the detached element
        selector: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Any other driver-level failure (CDP error, bad script, closed page)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Scenario-level expectation mismatch
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShopError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a not-found error for a selector
    #[must_use]
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::NotFound {
            selector: selector.into(),
        }
    }

    /// Whether this error is a deadline expiry
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error means the element is absent (never attached or detached)
    #[must_use]
    pub const fn is_missing_element(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Detached { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_names_target() {
        let err = ShopError::Timeout {
            ms: 10_000,
            what: "#login-button".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 10000ms waiting for #login-button"
        );
        assert!(err.is_timeout());
        assert!(!err.is_missing_element());
    }

    #[test]
    fn test_missing_element_classification() {
        assert!(ShopError::not_found(".cart_item").is_missing_element());
        assert!(ShopError::Detached {
            selector: ".cart_item".to_string()
        }
        .is_missing_element());
        assert!(!ShopError::driver("boom").is_missing_element());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ShopError = io.into();
        assert!(matches!(err, ShopError::Io(_)));
    }
}
