//! Shared library for cross-cutting concerns in the secrets manager provider.
//!
//! This crate provides centralized implementations for:
//! - Error types with retryability classification
//! - HTTP client configuration and building
//! - Service endpoint resolution per region and instance
//! - Tracing subscriber initialisation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod endpoint;
pub mod error;
pub mod http;
pub mod tracing_config;

pub use endpoint::{EndpointType, instance_endpoint};
pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use tracing_config::{TracingConfig, init_tracing};
