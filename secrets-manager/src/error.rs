//! Secrets manager error types using thiserror 2.0.
//!
//! Provides provider-specific errors with retryability classification
//! and integration with platform common errors.

use crate::identity::IdentityError;
use crate::waiter::WaitError;
use sm_common::PlatformError;
use thiserror::Error;

/// Secrets manager errors.
#[derive(Error, Debug)]
pub enum SecretsManagerError {
    /// The remote service answered 404
    #[error("{operation} failed: secret not found: {body}")]
    NotFound {
        /// API operation that was issued
        operation: &'static str,
        /// Response body, kept for diagnostics
        body: String,
    },

    /// The caller is not authorised for the operation
    #[error("{operation} failed: permission denied (status {status}): {body}")]
    PermissionDenied {
        /// API operation that was issued
        operation: &'static str,
        /// HTTP status (401 or 403)
        status: u16,
        /// Response body
        body: String,
    },

    /// Rate limited
    #[error("{operation} failed: rate limited: {body}")]
    RateLimited {
        /// API operation that was issued
        operation: &'static str,
        /// Response body
        body: String,
    },

    /// Service unavailable or unreachable
    #[error("Secrets manager unavailable: {0}")]
    Unavailable(String),

    /// Any other non-success response
    #[error("{operation} failed with status {status}: {body}")]
    Api {
        /// API operation that was issued
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Composite identity could not be parsed
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Operation requires an identity the resource does not have yet
    #[error("resource has no identity; create or import it first")]
    MissingIdentity,

    /// Field mapping between configuration and remote model failed
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Waiting for a created secret to become active failed
    #[error("Error waiting for secret {identity} to be created: {source}")]
    Provisioning {
        /// Composite identity of the secret being waited on
        identity: String,
        /// Why the wait ended
        #[source]
        source: WaitError,
    },

    /// Platform error
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for secrets manager operations.
pub type SecretsManagerResult<T> = Result<T, SecretsManagerError>;

impl SecretsManagerError {
    /// Check if error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::RateLimited { .. } | Self::Http(_) => true,
            Self::Platform(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Check if the remote service reported the secret as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Classify a non-success HTTP response.
    #[must_use]
    pub fn from_status(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => Self::NotFound { operation, body },
            401 | 403 => Self::PermissionDenied {
                operation,
                status,
                body,
            },
            429 => Self::RateLimited { operation, body },
            s if s >= 500 => Self::Unavailable(format!("{operation}: status {status}: {body}")),
            _ => Self::Api {
                operation,
                status,
                body,
            },
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Errors raised while translating between a configuration record and the
/// remote secret model. Each variant names the field that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A field the mapping needs is absent
    #[error("Error setting {field}: value is missing")]
    MissingField {
        /// Dotted field path
        field: String,
    },

    /// A field is present but its value cannot be used
    #[error("Error setting {field}: {reason}")]
    InvalidField {
        /// Dotted field path
        field: String,
        /// What is wrong with the value
        reason: String,
    },

    /// The remote record is of a different secret type
    #[error("expected a {expected} secret, got {actual}")]
    UnexpectedSecretType {
        /// Type tag the handler works with
        expected: &'static str,
        /// Type tag the service returned
        actual: String,
    },
}

impl MappingError {
    /// Create a missing field error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid field error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}
