//! Service endpoint resolution.
//!
//! Every secrets manager instance is served from its own host, derived from
//! the instance ID, the region and whether traffic goes over the public
//! internet or the private network.

use crate::PlatformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

const SERVICE_DOMAIN: &str = "secrets-manager.appdomain.cloud";

/// Network path used to reach an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    /// Public internet endpoint
    #[default]
    Public,
    /// Private network endpoint
    Private,
}

impl EndpointType {
    /// Get the configuration name of this endpoint type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointType {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(PlatformError::invalid_input(format!(
                "endpoint type must be 'public' or 'private', got '{other}'"
            ))),
        }
    }
}

/// Build the base URL of an instance.
///
/// # Errors
///
/// Returns [`PlatformError::InvalidInput`] when the instance ID or region is
/// empty, and [`PlatformError::InvalidEndpoint`] when they do not form a
/// valid host name.
///
/// # Examples
///
/// ```
/// use sm_common::{EndpointType, instance_endpoint};
///
/// let url = instance_endpoint("abc-123", "us-south", EndpointType::Private).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://abc-123.private.us-south.secrets-manager.appdomain.cloud/"
/// );
/// ```
pub fn instance_endpoint(
    instance_id: &str,
    region: &str,
    endpoint_type: EndpointType,
) -> Result<Url, PlatformError> {
    if instance_id.is_empty() {
        return Err(PlatformError::invalid_input("instance ID must not be empty"));
    }
    if region.is_empty() {
        return Err(PlatformError::invalid_input("region must not be empty"));
    }

    let raw = match endpoint_type {
        EndpointType::Public => format!("https://{instance_id}.{region}.{SERVICE_DOMAIN}"),
        EndpointType::Private => {
            format!("https://{instance_id}.private.{region}.{SERVICE_DOMAIN}")
        }
    };

    Url::parse(&raw).map_err(|e| PlatformError::invalid_endpoint(raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_endpoint() {
        let url = instance_endpoint("abc-123", "us-south", EndpointType::Public).unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc-123.us-south.secrets-manager.appdomain.cloud/"
        );
    }

    #[test]
    fn test_private_endpoint() {
        let url = instance_endpoint("abc-123", "eu-de", EndpointType::Private).unwrap();
        assert_eq!(url.host_str(), Some("abc-123.private.eu-de.secrets-manager.appdomain.cloud"));
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(matches!(
            instance_endpoint("", "us-south", EndpointType::Public),
            Err(PlatformError::InvalidInput(_))
        ));
        assert!(matches!(
            instance_endpoint("abc", "", EndpointType::Public),
            Err(PlatformError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_host_rejected() {
        let result = instance_endpoint("bad host", "us-south", EndpointType::Public);
        assert!(matches!(result, Err(PlatformError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_endpoint_type_parsing() {
        assert_eq!("public".parse::<EndpointType>().unwrap(), EndpointType::Public);
        assert_eq!(" PRIVATE ".parse::<EndpointType>().unwrap(), EndpointType::Private);
        assert!("direct".parse::<EndpointType>().is_err());
        assert_eq!(EndpointType::default(), EndpointType::Public);
    }
}
