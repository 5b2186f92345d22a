//! Shared test utilities for the secrets manager provider crates.
//!
//! This crate provides:
//! - Proptest generators for identities and remote secret records
//! - A scripted in-memory implementation of the secrets API
//! - Test fixtures with sample secret records

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
