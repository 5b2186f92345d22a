//! Secrets manager resource provider.
//!
//! Manages IAM credentials and public certificate secrets through the
//! secrets manager v2 API: create (waiting until the secret is provisioned),
//! read, update, delete and import.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod prototype;
pub mod resource_data;
pub mod resources;
pub mod secrets;
pub mod waiter;

pub use api::SecretsApi;
pub use client::SecretsManagerClient;
pub use config::SecretsManagerConfig;
pub use error::{MappingError, SecretsManagerError, SecretsManagerResult};
pub use identity::{IdentityError, InstanceLocation, SecretIdentity};
pub use lifecycle::{IamCredentialsController, LifecycleController, PublicCertificateController};
pub use resource_data::ResourceData;
pub use resources::{
    IamCredentialsConfig, IamCredentialsSecretResource, PublicCertificateConfig,
    PublicCertificateResource, RotationConfig, SecretResource,
};
pub use secrets::{Secret, SecretKind, SecretState};
pub use waiter::{ProvisioningState, ProvisioningWaiter, WaitError};
