//! Remote secret records as returned by the secrets manager API.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::collections::BTreeMap;
use std::fmt;

/// Secret types handled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretKind {
    /// Dynamically generated IAM API keys
    IamCredentials,
    /// Certificates ordered from a public certificate authority
    PublicCertificate,
}

impl SecretKind {
    /// Type tag used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IamCredentials => "iam_credentials",
            Self::PublicCertificate => "public_cert",
        }
    }

    /// Look up a kind by its wire tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "iam_credentials" => Some(Self::IamCredentials),
            "public_cert" => Some(Self::PublicCertificate),
            _ => None,
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a secret, following NIST SP 800-57.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretState {
    /// Created, secret material not generated yet
    PreActivation,
    /// Usable
    Active,
    /// Temporarily unusable
    Suspended,
    /// Expired or revoked
    Deactivated,
    /// Gone
    Destroyed,
}

impl SecretState {
    /// Map the integer state code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::PreActivation),
            1 => Some(Self::Active),
            2 => Some(Self::Suspended),
            3 => Some(Self::Deactivated),
            5 => Some(Self::Destroyed),
            _ => None,
        }
    }

    /// Integer state code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::PreActivation => 0,
            Self::Active => 1,
            Self::Suspended => 2,
            Self::Deactivated => 3,
            Self::Destroyed => 5,
        }
    }

    /// Text label reported as `state_description`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PreActivation => "pre_activation",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deactivated => "deactivated",
            Self::Destroyed => "destroyed",
        }
    }
}

/// Fields shared by every secret type.
#[derive(Debug, Clone, Deserialize)]
pub struct SecretMetadata {
    /// Server-assigned ID
    pub id: String,
    /// Type tag
    pub secret_type: String,
    /// Human-readable name
    pub name: Option<String>,
    /// Extended description
    pub description: Option<String>,
    /// Secret group, or `default`
    pub secret_group_id: Option<String>,
    /// Search labels
    pub labels: Option<Vec<String>>,
    /// Integer state code
    pub state: i64,
    /// Text representation of `state`
    pub state_description: String,
    /// Creator
    pub created_by: Option<String>,
    /// Creation time
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time
    pub updated_at: Option<DateTime<Utc>>,
    /// Cloud resource name
    pub crn: Option<String>,
    /// Whether the secret data has been retrieved
    pub downloaded: Option<bool>,
    /// Number of locks
    pub locks_total: Option<i64>,
    /// Number of versions
    pub versions_total: Option<i64>,
    /// User metadata
    pub custom_metadata: Option<BTreeMap<String, serde_json::Value>>,
}

/// Automatic rotation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    /// Whether the service rotates automatically
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rotate: Option<bool>,
    /// Length of the rotation interval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    /// Unit of the rotation interval (`day`, `month`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Whether a new private key is generated on rotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_keys: Option<bool>,
}

impl RotationPolicy {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.auto_rotate.is_none()
            && self.interval.is_none()
            && self.unit.is_none()
            && self.rotate_keys.is_none()
    }
}

/// IAM credentials secret.
#[derive(Debug, Clone, Deserialize)]
pub struct IamCredentialsSecret {
    /// Common fields
    #[serde(flatten)]
    pub metadata: SecretMetadata,
    /// Lease duration of generated API keys, in seconds
    #[serde(default, deserialize_with = "string_or_number")]
    pub ttl: Option<String>,
    /// Access groups the service ID is added to
    pub access_groups: Option<Vec<String>>,
    /// ID of the generated API key
    pub api_key_id: Option<String>,
    /// Service ID that owns the API key
    pub service_id: Option<String>,
    /// Whether `service_id` was supplied by the user
    pub service_id_is_static: Option<bool>,
    /// Whether reads reuse the same API key
    pub reuse_api_key: Option<bool>,
    /// Rotation settings
    pub rotation: Option<RotationPolicy>,
    /// Next scheduled rotation
    pub next_rotation_date: Option<DateTime<Utc>>,
    /// Generated API key
    pub api_key: Option<SecretString>,
}

/// DNS challenge issued by the certificate authority.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChallengeResource {
    /// Domain under validation
    pub domain: Option<String>,
    /// Challenge expiry
    pub expiration: Option<DateTime<Utc>>,
    /// Challenge status
    pub status: Option<String>,
    /// TXT record name
    pub txt_record_name: Option<String>,
    /// TXT record value
    pub txt_record_value: Option<String>,
}

/// Progress of a certificate order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CertificateIssuanceInfo {
    /// Whether the certificate was rotated automatically
    pub auto_rotated: Option<bool>,
    /// DNS challenges, in the order the service reports them
    pub challenges: Option<Vec<ChallengeResource>>,
    /// When the DNS challenge was validated
    pub dns_challenge_validation_time: Option<DateTime<Utc>>,
    /// Issuance error code
    pub error_code: Option<String>,
    /// Issuance error message
    pub error_message: Option<String>,
    /// When the certificate was ordered
    pub ordered_on: Option<DateTime<Utc>>,
    /// Order state code
    pub state: Option<i64>,
    /// Order state label
    pub state_description: Option<String>,
}

/// Certificate validity window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CertificateValidity {
    /// Start of validity
    pub not_before: Option<DateTime<Utc>>,
    /// End of validity
    pub not_after: Option<DateTime<Utc>>,
}

/// Public certificate secret.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicCertificate {
    /// Common fields
    #[serde(flatten)]
    pub metadata: SecretMetadata,
    /// Common name
    pub common_name: Option<String>,
    /// Subject alternative names
    pub alt_names: Option<Vec<String>>,
    /// Key algorithm
    pub key_algorithm: Option<String>,
    /// Certificate authority configuration name
    pub ca: Option<String>,
    /// DNS provider configuration name
    pub dns: Option<String>,
    /// Whether intermediates are bundled with the certificate
    pub bundle_certs: Option<bool>,
    /// Rotation settings
    pub rotation: Option<RotationPolicy>,
    /// Order progress
    pub issuance_info: Option<CertificateIssuanceInfo>,
    /// Signing algorithm
    pub signing_algorithm: Option<String>,
    /// Expiry of the issued certificate
    pub expiration_date: Option<DateTime<Utc>>,
    /// Issuer distinguished name
    pub issuer: Option<String>,
    /// Serial number
    pub serial_number: Option<String>,
    /// Validity window
    pub validity: Option<CertificateValidity>,
    /// PEM certificate
    pub certificate: Option<SecretString>,
    /// PEM intermediate chain
    pub intermediate: Option<SecretString>,
    /// PEM private key
    pub private_key: Option<SecretString>,
}

/// A secret of any type, discriminated by `secret_type`.
#[derive(Debug, Clone)]
pub enum Secret {
    /// `iam_credentials`
    IamCredentials(Box<IamCredentialsSecret>),
    /// `public_cert`
    PublicCertificate(Box<PublicCertificate>),
    /// A type this crate does not manage
    Other(SecretMetadata),
}

impl Secret {
    /// Common fields.
    #[must_use]
    pub fn metadata(&self) -> &SecretMetadata {
        match self {
            Self::IamCredentials(secret) => &secret.metadata,
            Self::PublicCertificate(secret) => &secret.metadata,
            Self::Other(metadata) => metadata,
        }
    }

    /// Server-assigned ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.metadata().id
    }

    /// Current state label.
    #[must_use]
    pub fn state_description(&self) -> &str {
        &self.metadata().state_description
    }

    /// Current state, if the code is a known one.
    #[must_use]
    pub fn state(&self) -> Option<SecretState> {
        SecretState::from_code(self.metadata().state)
    }

    /// The kind, or `None` for unmanaged types.
    #[must_use]
    pub const fn kind(&self) -> Option<SecretKind> {
        match self {
            Self::IamCredentials(_) => Some(SecretKind::IamCredentials),
            Self::PublicCertificate(_) => Some(SecretKind::PublicCertificate),
            Self::Other(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value
            .get("secret_type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| de::Error::missing_field("secret_type"))?;

        match SecretKind::from_tag(tag) {
            Some(SecretKind::IamCredentials) => serde_json::from_value(value)
                .map(|secret| Self::IamCredentials(Box::new(secret))),
            Some(SecretKind::PublicCertificate) => serde_json::from_value(value)
                .map(|secret| Self::PublicCertificate(Box::new(secret))),
            None => serde_json::from_value(value).map(Self::Other),
        }
        .map_err(de::Error::custom)
    }
}

/// The API reports `ttl` as a string but older instances send a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn iam_json() -> serde_json::Value {
        json!({
            "id": "sec-1",
            "secret_type": "iam_credentials",
            "name": "ci-key",
            "state": 1,
            "state_description": "active",
            "created_at": "2024-03-01T10:00:00.000Z",
            "ttl": 3600,
            "reuse_api_key": true,
            "api_key": "very-secret",
            "labels": ["ci"]
        })
    }

    #[test]
    fn test_decode_iam_credentials() {
        let secret: Secret = serde_json::from_value(iam_json()).unwrap();
        assert_eq!(secret.kind(), Some(SecretKind::IamCredentials));
        assert_eq!(secret.id(), "sec-1");
        assert_eq!(secret.state(), Some(SecretState::Active));

        let Secret::IamCredentials(iam) = secret else {
            panic!("expected iam credentials");
        };
        assert_eq!(iam.ttl.as_deref(), Some("3600"));
        assert_eq!(iam.api_key.as_ref().unwrap().expose_secret(), "very-secret");
    }

    #[test]
    fn test_secret_material_not_in_debug() {
        let secret: Secret = serde_json::from_value(iam_json()).unwrap();
        assert!(!format!("{secret:?}").contains("very-secret"));
    }

    #[test]
    fn test_unknown_type_decodes_as_other() {
        let secret: Secret = serde_json::from_value(json!({
            "id": "sec-2",
            "secret_type": "kv",
            "state": 1,
            "state_description": "active"
        }))
        .unwrap();
        assert!(secret.kind().is_none());
        assert_eq!(secret.metadata().secret_type, "kv");
    }

    #[test]
    fn test_missing_type_tag_rejected() {
        let result: Result<Secret, _> = serde_json::from_value(json!({"id": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_state_codes() {
        for state in [
            SecretState::PreActivation,
            SecretState::Active,
            SecretState::Suspended,
            SecretState::Deactivated,
            SecretState::Destroyed,
        ] {
            assert_eq!(SecretState::from_code(state.code()), Some(state));
        }
        assert_eq!(SecretState::from_code(4), None);
        assert_eq!(SecretState::Destroyed.label(), "destroyed");
    }
}
