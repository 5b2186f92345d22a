//! Errors raised below the resource layer: HTTP client construction and
//! service endpoint resolution.

use thiserror::Error;

/// Error type for the shared platform helpers.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A service endpoint could not be built
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// The endpoint text that failed to parse
        endpoint: String,
        /// Parser message
        reason: String,
    },

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlatformError {
    /// Check if this error is retryable.
    ///
    /// Only connect and timeout failures are worth another attempt; bad
    /// input and endpoints stay bad.
    ///
    /// # Examples
    ///
    /// ```
    /// use sm_common::PlatformError;
    ///
    /// let err = PlatformError::invalid_input("empty region");
    /// assert!(!err.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            Self::InvalidEndpoint { .. } | Self::InvalidInput(_) => false,
        }
    }

    /// Create an invalid endpoint error.
    #[must_use]
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
