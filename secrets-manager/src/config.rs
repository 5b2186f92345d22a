//! Secrets manager provider configuration.

use crate::{
    error::{SecretsManagerError, SecretsManagerResult},
    identity::InstanceLocation,
    secrets::SecretKind,
};
use secrecy::SecretString;
use sm_common::{EndpointType, HttpConfig};
use std::{env, str::FromStr, time::Duration};
use url::Url;

/// Default region when none is configured.
pub const DEFAULT_REGION: &str = "us-south";

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct SecretsManagerConfig {
    /// Region of the default instance
    pub region: String,
    /// Default instance ID, used when a resource does not name one
    pub instance_id: Option<String>,
    /// Public or private network endpoint
    pub endpoint_type: EndpointType,
    /// Fixed service URL, bypassing per-instance endpoint resolution
    pub endpoint_url: Option<Url>,
    /// Bearer token sent with every request
    pub access_token: SecretString,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Delay between provisioning polls
    pub poll_interval: Duration,
    /// How long to wait for IAM credentials to become active
    pub iam_credentials_create_timeout: Duration,
    /// How long to wait for a certificate order to complete
    pub public_cert_create_timeout: Duration,
}

impl Default for SecretsManagerConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            instance_id: None,
            endpoint_type: EndpointType::Public,
            endpoint_url: None,
            access_token: SecretString::from(String::new()),
            http: HttpConfig::default(),
            poll_interval: Duration::from_secs(5),
            iam_credentials_create_timeout: Duration::from_secs(20 * 60),
            public_cert_create_timeout: Duration::from_secs(35 * 60),
        }
    }
}

impl SecretsManagerConfig {
    /// Create a configuration for an instance.
    #[must_use]
    pub fn new(region: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_id: Some(instance_id.into()),
            ..Default::default()
        }
    }

    /// Load configuration from the environment, reading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsManagerError::InvalidConfig`] when `SM_INSTANCE_ID` or
    /// `SM_ACCESS_TOKEN` is missing, or a variable cannot be parsed.
    pub fn from_env() -> SecretsManagerResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsManagerError::InvalidConfig`] when `SM_INSTANCE_ID` or
    /// `SM_ACCESS_TOKEN` is missing, or a variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> SecretsManagerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let region = lookup("SM_REGION").unwrap_or(defaults.region);
        let instance_id = required_var(&lookup, "SM_INSTANCE_ID")?;
        let endpoint_type = parse_var(&lookup, "SM_ENDPOINT_TYPE", defaults.endpoint_type)?;
        let endpoint_url = lookup("SM_ENDPOINT_URL")
            .map(|raw| {
                Url::parse(&raw)
                    .map_err(|e| SecretsManagerError::config(format!("Invalid SM_ENDPOINT_URL: {e}")))
            })
            .transpose()?;
        let access_token = SecretString::from(required_var(&lookup, "SM_ACCESS_TOKEN")?);

        let http = defaults.http.with_timeout(Duration::from_secs(parse_var(
            &lookup,
            "SM_REQUEST_TIMEOUT",
            60,
        )?));
        let poll_interval = Duration::from_secs(parse_var(&lookup, "SM_POLL_INTERVAL", 5)?);
        if poll_interval.is_zero() {
            return Err(SecretsManagerError::config(
                "SM_POLL_INTERVAL must be at least 1 second",
            ));
        }
        let iam_credentials_create_timeout = Duration::from_secs(parse_var(
            &lookup,
            "SM_IAM_CREDENTIALS_CREATE_TIMEOUT",
            defaults.iam_credentials_create_timeout.as_secs(),
        )?);
        let public_cert_create_timeout = Duration::from_secs(parse_var(
            &lookup,
            "SM_PUBLIC_CERT_CREATE_TIMEOUT",
            defaults.public_cert_create_timeout.as_secs(),
        )?);

        Ok(Self {
            region,
            instance_id: Some(instance_id),
            endpoint_type,
            endpoint_url,
            access_token,
            http,
            poll_interval,
            iam_credentials_create_timeout,
            public_cert_create_timeout,
        })
    }

    /// Set the endpoint type.
    #[must_use]
    pub const fn with_endpoint_type(mut self, endpoint_type: EndpointType) -> Self {
        self.endpoint_type = endpoint_type;
        self
    }

    /// Send every request to a fixed URL.
    #[must_use]
    pub fn with_endpoint_url(mut self, url: Url) -> Self {
        self.endpoint_url = Some(url);
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = SecretString::from(token.into());
        self
    }

    /// Set HTTP client settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Set the provisioning poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the create timeout for one secret kind.
    #[must_use]
    pub const fn with_create_timeout(mut self, kind: SecretKind, timeout: Duration) -> Self {
        match kind {
            SecretKind::IamCredentials => self.iam_credentials_create_timeout = timeout,
            SecretKind::PublicCertificate => self.public_cert_create_timeout = timeout,
        }
        self
    }

    /// Create timeout for a secret kind.
    #[must_use]
    pub const fn create_timeout(&self, kind: SecretKind) -> Duration {
        match kind {
            SecretKind::IamCredentials => self.iam_credentials_create_timeout,
            SecretKind::PublicCertificate => self.public_cert_create_timeout,
        }
    }

    /// Default instance location.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsManagerError::InvalidConfig`] when no instance ID is
    /// configured.
    pub fn location(&self) -> SecretsManagerResult<InstanceLocation> {
        let instance_id = self
            .instance_id
            .as_deref()
            .ok_or_else(|| SecretsManagerError::config("instance ID is not configured"))?;
        Ok(InstanceLocation::new(self.region.clone(), instance_id))
    }
}

fn required_var<F>(lookup: &F, name: &str) -> SecretsManagerResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|val| !val.is_empty())
        .ok_or_else(|| SecretsManagerError::config(format!("{name} is required")))
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> SecretsManagerResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .parse()
            .map_err(|e| SecretsManagerError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}
