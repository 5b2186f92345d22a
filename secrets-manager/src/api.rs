//! Seam between the lifecycle logic and the remote service.

use crate::{
    error::SecretsManagerResult,
    identity::{InstanceLocation, SecretIdentity},
    prototype::{SecretMetadataPatch, SecretPrototype},
    secrets::Secret,
};
use async_trait::async_trait;

/// Remote secrets manager operations.
///
/// Implemented by [`crate::SecretsManagerClient`] over HTTP; tests supply
/// scripted implementations.
#[async_trait]
pub trait SecretsApi: Send + Sync {
    /// Create a secret in the given instance.
    async fn create_secret(
        &self,
        location: &InstanceLocation,
        prototype: &SecretPrototype,
    ) -> SecretsManagerResult<Secret>;

    /// Fetch a secret.
    async fn get_secret(&self, identity: &SecretIdentity) -> SecretsManagerResult<Secret>;

    /// Apply a merge patch to a secret's metadata.
    async fn update_secret_metadata(
        &self,
        identity: &SecretIdentity,
        patch: &SecretMetadataPatch,
    ) -> SecretsManagerResult<()>;

    /// Delete a secret.
    async fn delete_secret(&self, identity: &SecretIdentity) -> SecretsManagerResult<()>;
}
