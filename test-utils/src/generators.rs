//! Shared proptest generators.
//!
//! Record strategies produce JSON in the shape the service returns, so
//! properties run through the real decoding path.

use proptest::prelude::*;
use secrets_manager::{InstanceLocation, SecretIdentity};
use serde_json::{Map, Value, json};

/// Generate region names such as `us-south` or `eu-de`.
pub fn region_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("us-south".to_string()),
        Just("us-east".to_string()),
        Just("eu-de".to_string()),
        Just("eu-gb".to_string()),
        Just("jp-tok".to_string()),
        "[a-z]{2}-[a-z]{3,6}",
    ]
}

/// Generate UUID-shaped IDs.
pub fn uuid_strategy() -> impl Strategy<Value = String> {
    "[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}"
}

/// Generate composite secret identities.
pub fn secret_identity_strategy() -> impl Strategy<Value = SecretIdentity> {
    (region_strategy(), uuid_strategy(), uuid_strategy()).prop_map(
        |(region, instance_id, secret_id)| {
            SecretIdentity::new(InstanceLocation::new(region, instance_id), secret_id)
        },
    )
}

/// Generate secret names.
pub fn secret_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{2,30}"
}

/// Generate label lists, possibly empty.
pub fn labels_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_-]{1,15}", 0..5)
}

/// Generate custom metadata maps with string, number and boolean values.
pub fn custom_metadata_strategy() -> impl Strategy<Value = Map<String, Value>> {
    let value = prop_oneof![
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
    ];
    prop::collection::btree_map("[a-z][a-z_]{1,10}", value, 0..4)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Generate rotation policies as JSON, with any subset of fields present.
pub fn rotation_policy_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(1i64..=12),
        proptest::option::of(prop_oneof![Just("day"), Just("month")]),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(auto_rotate, interval, unit, rotate_keys)| {
            let mut policy = Map::new();
            if let Some(auto_rotate) = auto_rotate {
                policy.insert("auto_rotate".to_string(), json!(auto_rotate));
            }
            if let Some(interval) = interval {
                policy.insert("interval".to_string(), json!(interval));
            }
            if let Some(unit) = unit {
                policy.insert("unit".to_string(), json!(unit));
            }
            if let Some(rotate_keys) = rotate_keys {
                policy.insert("rotate_keys".to_string(), json!(rotate_keys));
            }
            Value::Object(policy)
        })
}

/// Generate state labels across the known set and beyond.
pub fn state_label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("pre_activation".to_string()),
        Just("active".to_string()),
        Just("suspended".to_string()),
        Just("deactivated".to_string()),
        Just("destroyed".to_string()),
        "[a-z_]{3,15}",
    ]
}

fn insert_non_empty(record: &mut Map<String, Value>, key: &str, value: Value) {
    let empty = match &value {
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Null => true,
        _ => false,
    };
    if !empty {
        record.insert(key.to_string(), value);
    }
}

/// Generate active IAM credentials records.
pub fn iam_credentials_record_strategy() -> impl Strategy<Value = Value> {
    (
        uuid_strategy(),
        secret_name_strategy(),
        proptest::option::of("[a-zA-Z ]{1,40}"),
        labels_strategy(),
        custom_metadata_strategy(),
        60u64..=7_776_000,
        prop::collection::vec("AccessGroupId-[a-f0-9]{8}", 0..3),
        proptest::option::of("ServiceId-[a-f0-9]{8}"),
        any::<bool>(),
        rotation_policy_strategy(),
    )
        .prop_map(
            |(id, name, description, labels, metadata, ttl, groups, service_id, reuse, rotation)| {
                let mut record = Map::new();
                record.insert("id".to_string(), json!(id));
                record.insert("secret_type".to_string(), json!("iam_credentials"));
                record.insert("name".to_string(), json!(name));
                record.insert("state".to_string(), json!(1));
                record.insert("state_description".to_string(), json!("active"));
                record.insert("ttl".to_string(), json!(ttl.to_string()));
                record.insert("reuse_api_key".to_string(), json!(reuse));
                insert_non_empty(&mut record, "description", json!(description));
                insert_non_empty(&mut record, "labels", json!(labels));
                insert_non_empty(&mut record, "custom_metadata", Value::Object(metadata));
                insert_non_empty(&mut record, "access_groups", json!(groups));
                insert_non_empty(&mut record, "service_id", json!(service_id));
                insert_non_empty(&mut record, "rotation", rotation);
                Value::Object(record)
            },
        )
}

/// Generate active public certificate records.
pub fn public_certificate_record_strategy() -> impl Strategy<Value = Value> {
    (
        uuid_strategy(),
        secret_name_strategy(),
        proptest::option::of("[a-zA-Z ]{1,40}"),
        labels_strategy(),
        custom_metadata_strategy(),
        "[a-z]{3,10}\\.(com|org|net)",
        prop::collection::vec("[a-z]{3,8}\\.example\\.com", 0..3),
        prop_oneof![Just("RSA2048"), Just("RSA4096"), Just("EC256"), Just("EC384")],
        ("[a-z-]{3,12}", "[a-z-]{3,12}"),
        any::<bool>(),
        rotation_policy_strategy(),
    )
        .prop_map(
            |(
                id,
                name,
                description,
                labels,
                metadata,
                common_name,
                alt_names,
                key_algorithm,
                (ca, dns),
                bundle_certs,
                rotation,
            )| {
                let mut record = Map::new();
                record.insert("id".to_string(), json!(id));
                record.insert("secret_type".to_string(), json!("public_cert"));
                record.insert("name".to_string(), json!(name));
                record.insert("state".to_string(), json!(1));
                record.insert("state_description".to_string(), json!("active"));
                record.insert("common_name".to_string(), json!(common_name));
                record.insert("key_algorithm".to_string(), json!(key_algorithm));
                record.insert("ca".to_string(), json!(ca));
                record.insert("dns".to_string(), json!(dns));
                record.insert("bundle_certs".to_string(), json!(bundle_certs));
                insert_non_empty(&mut record, "description", json!(description));
                insert_non_empty(&mut record, "labels", json!(labels));
                insert_non_empty(&mut record, "custom_metadata", Value::Object(metadata));
                insert_non_empty(&mut record, "alt_names", json!(alt_names));
                insert_non_empty(&mut record, "rotation", rotation);
                Value::Object(record)
            },
        )
}
