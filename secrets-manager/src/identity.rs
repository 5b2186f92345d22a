//! Addressing of secrets across regions and instances.
//!
//! The host runtime persists a secret's identity as the opaque string
//! `region/instanceId/secretId`. Inside the crate the identity is always the
//! structured [`SecretIdentity`]; the string form only exists at the
//! `Display`/`FromStr` boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors parsing a composite identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Not exactly three slash-delimited segments
    #[error("invalid secret identity '{input}': expected region/instance_id/secret_id, found {segments} segment(s)")]
    SegmentCount {
        /// The rejected input
        input: String,
        /// Number of segments found
        segments: usize,
    },

    /// One of the three segments is empty
    #[error("invalid secret identity '{input}': {segment} is empty")]
    EmptySegment {
        /// The rejected input
        input: String,
        /// Name of the empty segment
        segment: &'static str,
    },
}

/// A secrets manager instance in a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceLocation {
    /// Region the instance lives in, e.g. `us-south`
    pub region: String,
    /// Instance ID
    pub instance_id: String,
}

impl InstanceLocation {
    /// Create a new location.
    #[must_use]
    pub fn new(region: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_id: instance_id.into(),
        }
    }
}

impl fmt::Display for InstanceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.instance_id)
    }
}

/// Composite identity of a secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretIdentity {
    location: InstanceLocation,
    secret_id: String,
}

impl SecretIdentity {
    /// Create an identity for a secret at the given location.
    #[must_use]
    pub fn new(location: InstanceLocation, secret_id: impl Into<String>) -> Self {
        Self {
            location,
            secret_id: secret_id.into(),
        }
    }

    /// Instance the secret belongs to.
    #[must_use]
    pub const fn location(&self) -> &InstanceLocation {
        &self.location
    }

    /// Region segment.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.location.region
    }

    /// Instance segment.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.location.instance_id
    }

    /// Server-assigned secret ID.
    #[must_use]
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }
}

impl fmt::Display for SecretIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.secret_id)
    }
}

impl FromStr for SecretIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('/').collect();
        let [region, instance_id, secret_id] = segments.as_slice() else {
            return Err(IdentityError::SegmentCount {
                input: s.to_string(),
                segments: segments.len(),
            });
        };

        for (segment, value) in [
            ("region", region),
            ("instance_id", instance_id),
            ("secret_id", secret_id),
        ] {
            if value.is_empty() {
                return Err(IdentityError::EmptySegment {
                    input: s.to_string(),
                    segment,
                });
            }
        }

        Ok(Self::new(InstanceLocation::new(*region, *instance_id), *secret_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_composite_identity() {
        let id: SecretIdentity = "us-south/abc-123/sec-789".parse().unwrap();
        assert_eq!(id.region(), "us-south");
        assert_eq!(id.instance_id(), "abc-123");
        assert_eq!(id.secret_id(), "sec-789");
    }

    #[test]
    fn test_display_matches_persisted_form() {
        let id = SecretIdentity::new(InstanceLocation::new("eu-de", "inst"), "sec");
        assert_eq!(id.to_string(), "eu-de/inst/sec");
        assert_eq!(id.location().to_string(), "eu-de/inst");
    }

    #[test]
    fn test_wrong_segment_count() {
        let err = "us-south/abc-123".parse::<SecretIdentity>().unwrap_err();
        assert!(matches!(err, IdentityError::SegmentCount { segments: 2, .. }));

        let err = "a/b/c/d".parse::<SecretIdentity>().unwrap_err();
        assert!(matches!(err, IdentityError::SegmentCount { segments: 4, .. }));
    }

    #[test]
    fn test_empty_segment() {
        let err = "us-south//sec-789".parse::<SecretIdentity>().unwrap_err();
        assert_eq!(
            err,
            IdentityError::EmptySegment {
                input: "us-south//sec-789".to_string(),
                segment: "instance_id",
            }
        );
    }
}
