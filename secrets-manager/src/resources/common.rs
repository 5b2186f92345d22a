//! Field conversions shared by every secret type.

use crate::{
    error::MappingError,
    secrets::{RotationPolicy, SecretMetadata},
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Read-only fields the service reports for every secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretStatus {
    /// Server-assigned secret ID
    pub secret_id: Option<String>,
    /// Type tag
    pub secret_type: Option<String>,
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
    pub locks_total: Option<u32>,
    /// Number of versions
    pub versions_total: Option<u32>,
    /// Integer state code
    pub state: Option<i64>,
    /// State label
    pub state_description: Option<String>,
}

impl SecretStatus {
    /// Collect the read-only fields of a remote record.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidField`] when a counter does not fit.
    pub fn from_metadata(metadata: &SecretMetadata) -> Result<Self, MappingError> {
        Ok(Self {
            secret_id: Some(metadata.id.clone()),
            secret_type: Some(metadata.secret_type.clone()),
            created_by: metadata.created_by.clone(),
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
            crn: metadata.crn.clone(),
            downloaded: metadata.downloaded,
            locks_total: counter("locks_total", metadata.locks_total)?,
            versions_total: counter("versions_total", metadata.versions_total)?,
            state: Some(metadata.state),
            state_description: Some(metadata.state_description.clone()),
        })
    }
}

/// Rotation block of a local configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationConfig {
    /// Whether the service rotates automatically
    pub auto_rotate: Option<bool>,
    /// Length of the rotation interval
    pub interval: Option<u32>,
    /// Unit of the rotation interval
    pub unit: Option<String>,
    /// Whether a new private key is generated on rotation
    pub rotate_keys: Option<bool>,
}

impl RotationConfig {
    /// Rotation turned off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            auto_rotate: Some(false),
            interval: None,
            unit: None,
            rotate_keys: None,
        }
    }

    /// Convert to the wire policy, omitting an empty unit.
    #[must_use]
    pub fn to_policy(&self) -> RotationPolicy {
        RotationPolicy {
            auto_rotate: self.auto_rotate,
            interval: self.interval.map(i64::from),
            unit: self.unit.as_deref().and_then(non_empty),
            rotate_keys: self.rotate_keys,
        }
    }

    /// Convert from the wire policy.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidField`] naming `rotation.interval`
    /// when the interval is negative or too large.
    pub fn from_policy(policy: &RotationPolicy) -> Result<Self, MappingError> {
        let interval = policy
            .interval
            .map(|interval| {
                u32::try_from(interval).map_err(|e| MappingError::invalid("rotation.interval", e))
            })
            .transpose()?;

        Ok(Self {
            auto_rotate: policy.auto_rotate,
            interval,
            unit: policy.unit.clone(),
            rotate_keys: policy.rotate_keys,
        })
    }
}

/// `Some` unless the string is empty.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// `Some` unless the list is empty.
pub(crate) fn non_empty_list(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// `Some` unless the map is empty.
pub(crate) fn non_empty_map<V: Clone>(values: &BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    (!values.is_empty()).then(|| values.clone())
}

/// Remote list, or `current` when the service sent nothing.
pub(crate) fn list_or(remote: Option<&Vec<String>>, current: &[String]) -> Vec<String> {
    match remote {
        Some(values) if !values.is_empty() => values.clone(),
        _ => current.to_vec(),
    }
}

/// Remote custom metadata as sent, or `current` when the service sent
/// nothing.
pub(crate) fn custom_metadata_or(
    remote: Option<&BTreeMap<String, serde_json::Value>>,
    current: &BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, serde_json::Value> {
    match remote {
        Some(values) if !values.is_empty() => values.clone(),
        _ => current.clone(),
    }
}

/// A field the service must always send.
pub(crate) fn required<T: Clone>(field: &str, value: Option<&T>) -> Result<T, MappingError> {
    value.cloned().ok_or_else(|| MappingError::missing(field))
}

fn counter(field: &str, value: Option<i64>) -> Result<Option<u32>, MappingError> {
    value
        .map(|count| u32::try_from(count).map_err(|e| MappingError::invalid(field, e)))
        .transpose()
}
