//! Request payloads for creating secrets and patching their metadata.

use crate::secrets::RotationPolicy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Body of a create request. The variant decides `secret_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "secret_type")]
pub enum SecretPrototype {
    /// Create an IAM credentials secret
    #[serde(rename = "iam_credentials")]
    IamCredentials(IamCredentialsSecretPrototype),
    /// Order a public certificate
    #[serde(rename = "public_cert")]
    PublicCertificate(PublicCertificatePrototype),
}

/// Create payload for IAM credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IamCredentialsSecretPrototype {
    /// Human-readable name
    pub name: String,
    /// Lease duration in seconds
    pub ttl: String,
    /// Whether reads reuse the same API key
    pub reuse_api_key: bool,
    /// Extended description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Secret group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    /// Search labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Access groups for the generated service ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_groups: Option<Vec<String>>,
    /// Existing service ID to generate keys for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Rotation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    /// User metadata for the secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// User metadata for the first version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_custom_metadata: Option<BTreeMap<String, String>>,
}

/// Create payload for a public certificate order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublicCertificatePrototype {
    /// Human-readable name
    pub name: String,
    /// Common name
    pub common_name: String,
    /// Certificate authority configuration name
    pub ca: String,
    /// DNS provider configuration name
    pub dns: String,
    /// Extended description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Secret group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    /// Search labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Subject alternative names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_names: Option<Vec<String>>,
    /// Key algorithm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
    /// Whether intermediates are bundled with the certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_certs: Option<bool>,
    /// Rotation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
    /// User metadata for the secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// User metadata for the first version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_custom_metadata: Option<BTreeMap<String, String>>,
}

/// Merge patch for a secret's metadata. Absent fields are left unchanged
/// by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecretMetadataPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description; empty string clears it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Replacement custom metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// New lease duration, IAM credentials only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    /// Replacement rotation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationPolicy>,
}

impl SecretMetadataPatch {
    /// True when the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.labels.is_none()
            && self.custom_metadata.is_none()
            && self.ttl.is_none()
            && self.rotation.is_none()
    }
}
