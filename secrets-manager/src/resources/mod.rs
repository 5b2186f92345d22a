//! Secret types managed through the lifecycle controller.
//!
//! Each secret type implements [`SecretResource`]: the mapping between its
//! local configuration record and the remote model.

mod common;
mod iam_credentials;
mod public_certificate;

pub use common::{RotationConfig, SecretStatus};
pub use iam_credentials::{IamCredentialsConfig, IamCredentialsSecretResource, MAX_TTL, MIN_TTL};
pub use public_certificate::{
    CertificateValidityWindow, ChallengeState, IssuanceInfoState, KEY_ALGORITHMS,
    PublicCertificateConfig, PublicCertificateResource,
};

use crate::{
    error::MappingError,
    prototype::{SecretMetadataPatch, SecretPrototype},
    resource_data::ResourceData,
    secrets::{Secret, SecretKind},
};
use std::fmt;

/// Mapping between one secret type's local configuration and the remote
/// model.
pub trait SecretResource: Send + Sync + 'static {
    /// Local configuration record.
    type Config: Clone + Default + fmt::Debug + Send + Sync;

    /// Secret type handled.
    const KIND: SecretKind;

    /// Build the create request from the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] naming the first field that is missing or
    /// invalid.
    fn to_prototype(config: &Self::Config) -> Result<SecretPrototype, MappingError>;

    /// Produce the configuration that reflects a remote record.
    ///
    /// Starts from `current` so fields the service never returns are kept.
    /// The result is complete before it is returned, so a failure leaves
    /// the caller's state untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] naming the field that could not be set, or
    /// [`MappingError::UnexpectedSecretType`] for a record of another type.
    fn from_remote(secret: &Secret, current: &Self::Config) -> Result<Self::Config, MappingError>;

    /// Build a metadata patch from the tracked fields that changed.
    ///
    /// Returns `None` when nothing tracked changed.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] when a changed field is invalid.
    fn metadata_patch(
        data: &ResourceData<Self::Config>,
    ) -> Result<Option<SecretMetadataPatch>, MappingError>;
}

pub(crate) fn unexpected_type(kind: SecretKind, secret: &Secret) -> MappingError {
    MappingError::UnexpectedSecretType {
        expected: kind.as_str(),
        actual: secret.metadata().secret_type.clone(),
    }
}
