//! Create, read, update, delete and import of secrets.

use crate::{
    api::SecretsApi,
    config::SecretsManagerConfig,
    error::{MappingError, SecretsManagerError, SecretsManagerResult},
    identity::{InstanceLocation, SecretIdentity},
    resource_data::ResourceData,
    resources::{IamCredentialsSecretResource, PublicCertificateResource, SecretResource},
    waiter::ProvisioningWaiter,
};
use std::{marker::PhantomData, sync::Arc};
use tracing::{debug, info, instrument, warn};

/// Lifecycle handlers for one secret type.
///
/// Holds no per-resource state: every call works on the [`ResourceData`]
/// it is given and every read goes to the service.
pub struct LifecycleController<R> {
    api: Arc<dyn SecretsApi>,
    waiter: ProvisioningWaiter,
    _resource: PhantomData<fn() -> R>,
}

/// Controller for IAM credentials secrets.
pub type IamCredentialsController = LifecycleController<IamCredentialsSecretResource>;

/// Controller for public certificates.
pub type PublicCertificateController = LifecycleController<PublicCertificateResource>;

impl<R: SecretResource> LifecycleController<R> {
    /// Create a controller with an explicit waiter.
    #[must_use]
    pub fn new(api: Arc<dyn SecretsApi>, waiter: ProvisioningWaiter) -> Self {
        Self {
            api,
            waiter,
            _resource: PhantomData,
        }
    }

    /// Create a controller using the poll interval and create timeout
    /// configured for this secret type.
    #[must_use]
    pub fn from_config(api: Arc<dyn SecretsApi>, config: &SecretsManagerConfig) -> Self {
        let waiter =
            ProvisioningWaiter::new(config.poll_interval, config.create_timeout(R::KIND));
        Self::new(api, waiter)
    }

    /// Waiter used after create.
    #[must_use]
    pub const fn waiter(&self) -> &ProvisioningWaiter {
        &self.waiter
    }

    /// Create the secret, wait for it to become active and read it back.
    ///
    /// The identity is recorded as soon as the service accepts the create
    /// request, so a secret that never becomes active is still tracked.
    ///
    /// # Errors
    ///
    /// Returns a mapping error before any request when the configuration is
    /// invalid, the API error when the create request fails, and
    /// [`SecretsManagerError::Provisioning`] when waiting fails.
    #[instrument(skip_all, fields(kind = %R::KIND, location = %location))]
    pub async fn create(
        &self,
        location: &InstanceLocation,
        data: &mut ResourceData<R::Config>,
    ) -> SecretsManagerResult<()> {
        let prototype = R::to_prototype(data.config())?;
        let created = self.api.create_secret(location, &prototype).await?;

        let identity = SecretIdentity::new(location.clone(), created.id());
        data.set_identity(identity.clone());
        info!(identity = %identity, "Secret created");

        if created.kind() != Some(R::KIND) {
            return Err(MappingError::UnexpectedSecretType {
                expected: R::KIND.as_str(),
                actual: created.metadata().secret_type.clone(),
            }
            .into());
        }

        self.waiter
            .wait(self.api.as_ref(), &identity, R::KIND)
            .await
            .map_err(|source| SecretsManagerError::Provisioning {
                identity: identity.to_string(),
                source,
            })?;

        self.read(data).await
    }

    /// Refresh the configuration from the service.
    ///
    /// A secret the service no longer knows about clears the identity and
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsManagerError::MissingIdentity`] without an identity,
    /// the API error for failures other than not found, and a mapping error
    /// when the record cannot be applied. State is left unchanged on error.
    #[instrument(skip_all, fields(kind = %R::KIND))]
    pub async fn read(&self, data: &mut ResourceData<R::Config>) -> SecretsManagerResult<()> {
        let identity = data
            .identity()
            .cloned()
            .ok_or(SecretsManagerError::MissingIdentity)?;

        match self.api.get_secret(&identity).await {
            Ok(secret) => {
                let state = R::from_remote(&secret, data.config())?;
                data.apply_state(state);
                debug!(identity = %identity, "Secret read");
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                warn!(identity = %identity, "Secret not found, removing from state");
                data.clear_identity();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Send the changed tracked fields, then read back.
    ///
    /// Does nothing when no tracked field changed.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsManagerError::MissingIdentity`] without an identity,
    /// a mapping error for an invalid changed field, or the API error.
    #[instrument(skip_all, fields(kind = %R::KIND))]
    pub async fn update(&self, data: &mut ResourceData<R::Config>) -> SecretsManagerResult<()> {
        let identity = data
            .identity()
            .cloned()
            .ok_or(SecretsManagerError::MissingIdentity)?;

        let Some(patch) = R::metadata_patch(data)? else {
            debug!(identity = %identity, "No tracked field changed");
            return Ok(());
        };

        self.api.update_secret_metadata(&identity, &patch).await?;
        info!(identity = %identity, "Secret metadata updated");

        self.read(data).await
    }

    /// Delete the secret and clear the identity.
    ///
    /// # Errors
    ///
    /// Returns [`SecretsManagerError::MissingIdentity`] without an identity,
    /// or the API error; the identity is kept on error.
    #[instrument(skip_all, fields(kind = %R::KIND))]
    pub async fn delete(&self, data: &mut ResourceData<R::Config>) -> SecretsManagerResult<()> {
        let identity = data
            .identity()
            .cloned()
            .ok_or(SecretsManagerError::MissingIdentity)?;

        self.api.delete_secret(&identity).await?;
        data.clear_identity();
        info!(identity = %identity, "Secret deleted");
        Ok(())
    }

    /// Adopt an existing secret by its composite identity.
    ///
    /// # Errors
    ///
    /// Returns an identity error for a malformed ID,
    /// [`SecretsManagerError::NotFound`] when the secret does not exist, or
    /// any error from [`LifecycleController::read`].
    #[instrument(skip(self), fields(kind = %R::KIND))]
    pub async fn import(&self, id: &str) -> SecretsManagerResult<ResourceData<R::Config>> {
        let identity: SecretIdentity = id.parse()?;
        let mut data = ResourceData::imported(identity);
        self.read(&mut data).await?;

        if data.identity().is_none() {
            return Err(SecretsManagerError::NotFound {
                operation: "import",
                body: format!("secret {id} does not exist"),
            });
        }
        info!(identity = id, "Secret imported");
        Ok(data)
    }
}
