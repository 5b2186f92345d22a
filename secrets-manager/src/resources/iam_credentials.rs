//! IAM credentials secrets.

use super::{
    SecretResource,
    common::{
        RotationConfig, SecretStatus, custom_metadata_or, list_or, non_empty, non_empty_list,
        non_empty_map, required,
    },
    unexpected_type,
};
use crate::{
    error::MappingError,
    prototype::{IamCredentialsSecretPrototype, SecretMetadataPatch, SecretPrototype},
    resource_data::ResourceData,
    secrets::{Secret, SecretKind},
};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::collections::BTreeMap;

/// Shortest accepted API key lease, in seconds.
pub const MIN_TTL: u64 = 60;
/// Longest accepted API key lease (90 days), in seconds.
pub const MAX_TTL: u64 = 7_776_000;

/// Local configuration of an IAM credentials secret.
#[derive(Debug, Clone, Default)]
pub struct IamCredentialsConfig {
    /// Human-readable name
    pub name: String,
    /// Extended description
    pub description: Option<String>,
    /// Secret group; fixed after creation
    pub secret_group_id: Option<String>,
    /// Search labels
    pub labels: Vec<String>,
    /// API key lease in seconds
    pub ttl: String,
    /// Access groups for the generated service ID; fixed after creation
    pub access_groups: Vec<String>,
    /// Existing service ID to generate keys for; fixed after creation
    pub service_id: Option<String>,
    /// Whether reads reuse the same API key; fixed after creation
    pub reuse_api_key: bool,
    /// Rotation settings
    pub rotation: Option<RotationConfig>,
    /// User metadata for the secret
    pub custom_metadata: BTreeMap<String, serde_json::Value>,
    /// User metadata for the first version; only sent on create
    pub version_custom_metadata: BTreeMap<String, String>,

    /// Fields common to every secret
    pub status: SecretStatus,
    /// ID of the generated API key
    pub api_key_id: Option<String>,
    /// Whether `service_id` was supplied rather than generated
    pub service_id_is_static: Option<bool>,
    /// Next scheduled rotation
    pub next_rotation_date: Option<DateTime<Utc>>,
    /// Generated API key
    pub api_key: Option<SecretString>,
}

impl IamCredentialsConfig {
    /// Create a configuration with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, ttl: impl Into<String>, reuse_api_key: bool) -> Self {
        Self {
            name: name.into(),
            ttl: ttl.into(),
            reuse_api_key,
            ..Default::default()
        }
    }
}

fn validate_ttl(ttl: &str) -> Result<(), MappingError> {
    let seconds: u64 = ttl
        .parse()
        .map_err(|_| MappingError::invalid("ttl", format!("'{ttl}' is not a number of seconds")))?;

    if (MIN_TTL..=MAX_TTL).contains(&seconds) {
        Ok(())
    } else {
        Err(MappingError::invalid(
            "ttl",
            format!("{seconds} is outside {MIN_TTL}..={MAX_TTL} seconds"),
        ))
    }
}

/// [`SecretResource`] for `iam_credentials` secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct IamCredentialsSecretResource;

impl SecretResource for IamCredentialsSecretResource {
    type Config = IamCredentialsConfig;

    const KIND: SecretKind = SecretKind::IamCredentials;

    fn to_prototype(config: &Self::Config) -> Result<SecretPrototype, MappingError> {
        if config.name.is_empty() {
            return Err(MappingError::missing("name"));
        }
        validate_ttl(&config.ttl)?;

        Ok(SecretPrototype::IamCredentials(IamCredentialsSecretPrototype {
            name: config.name.clone(),
            ttl: config.ttl.clone(),
            reuse_api_key: config.reuse_api_key,
            description: config.description.as_deref().and_then(non_empty),
            secret_group_id: config.secret_group_id.as_deref().and_then(non_empty),
            labels: non_empty_list(&config.labels),
            access_groups: non_empty_list(&config.access_groups),
            service_id: config.service_id.as_deref().and_then(non_empty),
            rotation: config.rotation.as_ref().map(RotationConfig::to_policy),
            custom_metadata: non_empty_map(&config.custom_metadata),
            version_custom_metadata: non_empty_map(&config.version_custom_metadata),
        }))
    }

    fn from_remote(secret: &Secret, current: &Self::Config) -> Result<Self::Config, MappingError> {
        let Secret::IamCredentials(remote) = secret else {
            return Err(unexpected_type(Self::KIND, secret));
        };
        let metadata = &remote.metadata;
        let mut config = current.clone();

        config.name = required("name", metadata.name.as_ref())?;
        config.description.clone_from(&metadata.description);
        config.secret_group_id.clone_from(&metadata.secret_group_id);
        config.labels = list_or(metadata.labels.as_ref(), &current.labels);
        config.custom_metadata =
            custom_metadata_or(metadata.custom_metadata.as_ref(), &current.custom_metadata);
        config.status = SecretStatus::from_metadata(metadata)?;

        if let Some(ttl) = &remote.ttl {
            config.ttl.clone_from(ttl);
        }
        config.access_groups = list_or(remote.access_groups.as_ref(), &current.access_groups);
        config.service_id.clone_from(&remote.service_id);
        if let Some(reuse) = remote.reuse_api_key {
            config.reuse_api_key = reuse;
        }
        if let Some(policy) = remote.rotation.as_ref().filter(|p| !p.is_empty()) {
            config.rotation = Some(RotationConfig::from_policy(policy)?);
        }

        config.api_key_id.clone_from(&remote.api_key_id);
        config.service_id_is_static = remote.service_id_is_static;
        config.next_rotation_date = remote.next_rotation_date;
        config.api_key.clone_from(&remote.api_key);

        Ok(config)
    }

    fn metadata_patch(
        data: &ResourceData<Self::Config>,
    ) -> Result<Option<SecretMetadataPatch>, MappingError> {
        let config = data.config();
        let mut patch = SecretMetadataPatch::default();

        if data.has_change(|c| &c.name) {
            patch.name = Some(config.name.clone());
        }
        if data.has_change(|c| &c.description) {
            patch.description = Some(config.description.clone().unwrap_or_default());
        }
        if data.has_change(|c| &c.labels) {
            patch.labels = Some(config.labels.clone());
        }
        if data.has_change(|c| &c.custom_metadata) {
            patch.custom_metadata = Some(config.custom_metadata.clone());
        }
        if data.has_change(|c| &c.ttl) {
            validate_ttl(&config.ttl)?;
            patch.ttl = Some(config.ttl.clone());
        }
        if data.has_change(|c| &c.rotation) {
            let rotation = config.rotation.clone().unwrap_or_else(RotationConfig::disabled);
            patch.rotation = Some(rotation.to_policy());
        }

        Ok((!patch.is_empty()).then_some(patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{InstanceLocation, SecretIdentity};
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn remote() -> Secret {
        serde_json::from_value(json!({
            "id": "sec-1",
            "secret_type": "iam_credentials",
            "name": "ci-key",
            "description": "CI",
            "secret_group_id": "default",
            "labels": ["ci", "deploy"],
            "state": 1,
            "state_description": "active",
            "locks_total": 0,
            "versions_total": 2,
            "custom_metadata": {"team": "platform"},
            "ttl": "3600",
            "access_groups": ["AccessGroupId-1"],
            "service_id": "ServiceId-1",
            "service_id_is_static": false,
            "reuse_api_key": true,
            "api_key_id": "ApiKey-1",
            "api_key": "key-material",
            "rotation": {"auto_rotate": true, "interval": 30, "unit": "day"}
        }))
        .unwrap()
    }

    fn identity() -> SecretIdentity {
        SecretIdentity::new(InstanceLocation::new("us-south", "inst"), "sec-1")
    }

    #[test]
    fn test_to_prototype_omits_unset_fields() {
        let config = IamCredentialsConfig::new("ci-key", "3600", false);
        let prototype = IamCredentialsSecretResource::to_prototype(&config).unwrap();
        let body = serde_json::to_value(&prototype).unwrap();
        assert_eq!(
            body,
            json!({
                "secret_type": "iam_credentials",
                "name": "ci-key",
                "ttl": "3600",
                "reuse_api_key": false
            })
        );
    }

    #[test]
    fn test_ttl_bounds() {
        for (ttl, ok) in [("59", false), ("60", true), ("7776000", true), ("7776001", false), ("1h", false)] {
            let config = IamCredentialsConfig::new("n", ttl, true);
            let result = IamCredentialsSecretResource::to_prototype(&config);
            assert_eq!(result.is_ok(), ok, "ttl {ttl}");
            if let Err(err) = result {
                assert!(matches!(err, MappingError::InvalidField { ref field, .. } if field == "ttl"));
            }
        }
    }

    #[test]
    fn test_from_remote_sets_exposed_fields() {
        let mut current = IamCredentialsConfig::new("old", "60", false);
        current
            .version_custom_metadata
            .insert("build".to_string(), "7".to_string());

        let config = IamCredentialsSecretResource::from_remote(&remote(), &current).unwrap();
        assert_eq!(config.name, "ci-key");
        assert_eq!(config.ttl, "3600");
        assert!(config.reuse_api_key);
        assert_eq!(config.labels, vec!["ci", "deploy"]);
        assert_eq!(config.custom_metadata["team"], "platform");
        assert_eq!(config.rotation.as_ref().unwrap().interval, Some(30));
        assert_eq!(config.status.versions_total, Some(2));
        assert_eq!(config.status.secret_id.as_deref(), Some("sec-1"));
        assert_eq!(config.api_key.as_ref().unwrap().expose_secret(), "key-material");
        assert_eq!(config.version_custom_metadata["build"], "7");
    }

    #[test]
    fn test_from_remote_rejects_other_type() {
        let cert: Secret = serde_json::from_value(json!({
            "id": "c",
            "secret_type": "public_cert",
            "state": 1,
            "state_description": "active"
        }))
        .unwrap();
        let err = IamCredentialsSecretResource::from_remote(&cert, &IamCredentialsConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::UnexpectedSecretType {
                expected: "iam_credentials",
                actual: "public_cert".to_string(),
            }
        );
    }

    #[test]
    fn test_patch_contains_only_changed_fields() {
        let stored =
            IamCredentialsSecretResource::from_remote(&remote(), &IamCredentialsConfig::default())
                .unwrap();
        let mut desired = stored.clone();
        desired.description = None;
        desired.ttl = "7200".to_string();

        let data = ResourceData::with_prior(identity(), desired, stored);
        let patch = IamCredentialsSecretResource::metadata_patch(&data)
            .unwrap()
            .unwrap();
        assert_eq!(
            patch,
            SecretMetadataPatch {
                description: Some(String::new()),
                ttl: Some("7200".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_added_metadata_key_keeps_other_value_types() {
        let raw = json!({
            "id": "sec-1",
            "secret_type": "iam_credentials",
            "name": "ci-key",
            "state": 1,
            "state_description": "active",
            "custom_metadata": {"tier": 2, "prod": true},
            "ttl": "3600"
        });
        let stored = IamCredentialsSecretResource::from_remote(
            &serde_json::from_value(raw).unwrap(),
            &IamCredentialsConfig::default(),
        )
        .unwrap();
        let mut desired = stored.clone();
        desired.custom_metadata.insert("team".to_string(), json!("x"));

        let data = ResourceData::with_prior(identity(), desired, stored);
        let patch = IamCredentialsSecretResource::metadata_patch(&data)
            .unwrap()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"custom_metadata": {"tier": 2, "prod": true, "team": "x"}})
        );
    }

    #[test]
    fn test_no_change_no_patch() {
        let stored =
            IamCredentialsSecretResource::from_remote(&remote(), &IamCredentialsConfig::default())
                .unwrap();
        let data = ResourceData::with_prior(identity(), stored.clone(), stored);
        assert!(IamCredentialsSecretResource::metadata_patch(&data).unwrap().is_none());
    }

    #[test]
    fn test_removed_rotation_disables_it() {
        let stored =
            IamCredentialsSecretResource::from_remote(&remote(), &IamCredentialsConfig::default())
                .unwrap();
        let mut desired = stored.clone();
        desired.rotation = None;

        let data = ResourceData::with_prior(identity(), desired, stored);
        let patch = IamCredentialsSecretResource::metadata_patch(&data)
            .unwrap()
            .unwrap();
        assert_eq!(patch.rotation.unwrap().auto_rotate, Some(false));
    }
}
