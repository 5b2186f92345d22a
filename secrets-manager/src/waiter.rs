//! Polling a newly created secret until it leaves `pre_activation`.
//!
//! Some secrets are usable as soon as the create call returns; others, such
//! as certificate orders, stay in `pre_activation` while the service works
//! on them in the background. [`ProvisioningWaiter`] polls the secret until
//! its state settles or the deadline passes.

use crate::{
    api::SecretsApi,
    error::SecretsManagerError,
    identity::SecretIdentity,
    secrets::{Secret, SecretKind, SecretState},
};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, info, instrument, warn};

/// Why waiting for a secret ended without it becoming active.
#[derive(Error, Debug)]
pub enum WaitError {
    /// The secret reached a terminal failure state
    #[error("secret entered state '{state}'")]
    Failed {
        /// Reported state label
        state: String,
        /// Last observed record
        secret: Box<Secret>,
    },

    /// The secret disappeared while being waited on
    #[error("secret no longer exists (after {polls} poll(s))")]
    Vanished {
        /// Polls issued before the secret disappeared
        polls: u32,
    },

    /// The deadline passed while the secret was still pending
    #[error("timed out after {timeout:?} (last state: {}, {polls} poll(s))", .last_state.as_deref().unwrap_or("unknown"))]
    Timeout {
        /// Configured wait budget
        timeout: Duration,
        /// Last observed state label
        last_state: Option<String>,
        /// Polls issued
        polls: u32,
    },

    /// A poll failed
    #[error("polling failed: {0}")]
    Poll(#[source] Box<SecretsManagerError>),
}

/// Classification of a state label for the purpose of waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// Keep polling
    Pending,
    /// Done
    Active,
    /// Stop and report failure
    Failed,
}

impl SecretKind {
    /// Classify a state label reported for a secret of this kind.
    ///
    /// Labels outside the known set are treated as success so the secret is
    /// kept rather than leaked.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub fn provisioning_state(&self, label: &str) -> ProvisioningState {
        let state = match (self, label) {
            (Self::IamCredentials | Self::PublicCertificate, "pre_activation") => {
                ProvisioningState::Pending
            }
            (Self::IamCredentials | Self::PublicCertificate, "destroyed") => {
                ProvisioningState::Failed
            }
            (Self::IamCredentials, _) => ProvisioningState::Active,
            (Self::PublicCertificate, _) => ProvisioningState::Active,
        };

        if state == ProvisioningState::Active && label != SecretState::Active.label() {
            warn!(kind = %self, state = label, "Secret settled in an unexpected state");
        }
        state
    }
}

/// Shortest delay the waiter leaves between two polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polls a secret until it is provisioned.
#[derive(Debug, Clone, Copy)]
pub struct ProvisioningWaiter {
    poll_interval: Duration,
    timeout: Duration,
}

impl ProvisioningWaiter {
    /// Create a waiter. Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    #[must_use]
    pub const fn new(poll_interval: Duration, timeout: Duration) -> Self {
        let poll_interval = if poll_interval.as_nanos() < MIN_POLL_INTERVAL.as_nanos() {
            MIN_POLL_INTERVAL
        } else {
            poll_interval
        };
        Self {
            poll_interval,
            timeout,
        }
    }

    /// Delay between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Overall wait budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for the secret to become active, starting the clock now.
    ///
    /// # Errors
    ///
    /// See [`ProvisioningWaiter::wait_until`].
    pub async fn wait(
        &self,
        api: &dyn SecretsApi,
        identity: &SecretIdentity,
        kind: SecretKind,
    ) -> Result<Secret, WaitError> {
        self.wait_until(api, identity, kind, Instant::now() + self.timeout)
            .await
    }

    /// Wait for the secret to become active before `deadline`.
    ///
    /// The first poll is issued immediately. At least one poll is always
    /// attempted, even when the deadline has already passed.
    ///
    /// # Errors
    ///
    /// - [`WaitError::Failed`] when the secret reaches a failure state
    /// - [`WaitError::Vanished`] when a poll reports the secret missing
    /// - [`WaitError::Timeout`] when the deadline passes while pending
    /// - [`WaitError::Poll`] when a poll fails for any other reason
    #[instrument(skip_all, fields(identity = %identity, kind = %kind))]
    pub async fn wait_until(
        &self,
        api: &dyn SecretsApi,
        identity: &SecretIdentity,
        kind: SecretKind,
        deadline: Instant,
    ) -> Result<Secret, WaitError> {
        let mut polls: u32 = 0;
        let mut last_state: Option<String> = None;

        loop {
            if polls > 0 && Instant::now() >= deadline {
                return Err(self.timed_out(last_state, polls));
            }

            let poll = if polls == 0 {
                Ok(api.get_secret(identity).await)
            } else {
                timeout_at(deadline, api.get_secret(identity)).await
            };
            polls += 1;

            let secret = match poll {
                Ok(Ok(secret)) => secret,
                Ok(Err(err)) if err.is_not_found() => {
                    warn!(polls, "Secret disappeared while waiting");
                    return Err(WaitError::Vanished { polls });
                }
                Ok(Err(err)) => return Err(WaitError::Poll(Box::new(err))),
                Err(_) => return Err(self.timed_out(last_state, polls)),
            };

            let label = secret.state_description().to_string();
            match kind.provisioning_state(&label) {
                ProvisioningState::Active => {
                    info!(polls, state = %label, "Secret provisioned");
                    return Ok(secret);
                }
                ProvisioningState::Failed => {
                    warn!(polls, state = %label, "Secret provisioning failed");
                    return Err(WaitError::Failed {
                        state: label,
                        secret: Box::new(secret),
                    });
                }
                ProvisioningState::Pending => {
                    debug!(polls, state = %label, "Secret still provisioning");
                    last_state = Some(label);
                }
            }

            let next = Instant::now() + self.poll_interval;
            sleep_until(next.min(deadline)).await;
        }
    }

    const fn timed_out(&self, last_state: Option<String>, polls: u32) -> WaitError {
        WaitError::Timeout {
            timeout: self.timeout,
            last_state,
            polls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        for kind in [SecretKind::IamCredentials, SecretKind::PublicCertificate] {
            assert_eq!(kind.provisioning_state("pre_activation"), ProvisioningState::Pending);
            assert_eq!(kind.provisioning_state("active"), ProvisioningState::Active);
            assert_eq!(kind.provisioning_state("destroyed"), ProvisioningState::Failed);
        }
    }

    #[test]
    fn test_unknown_label_is_success() {
        assert_eq!(
            SecretKind::PublicCertificate.provisioning_state("suspended"),
            ProvisioningState::Active
        );
        assert_eq!(
            SecretKind::IamCredentials.provisioning_state("something_new"),
            ProvisioningState::Active
        );
    }

    #[test]
    fn test_timeout_display_names_last_state() {
        let err = WaitError::Timeout {
            timeout: Duration::from_secs(30),
            last_state: Some("pre_activation".to_string()),
            polls: 7,
        };
        assert_eq!(
            err.to_string(),
            "timed out after 30s (last state: pre_activation, 7 poll(s))"
        );
    }
}
