//! Per-resource working state handed to the lifecycle handlers.

use crate::identity::SecretIdentity;

/// Desired configuration of one resource together with its identity and the
/// last state recorded from the service.
///
/// `config` is what the user wants; `prior` is what was stored after the
/// last successful read. Field-level change detection compares the two.
#[derive(Debug, Clone)]
pub struct ResourceData<C> {
    identity: Option<SecretIdentity>,
    config: C,
    prior: Option<C>,
}

impl<C> ResourceData<C> {
    /// Start from a desired configuration with no remote counterpart.
    #[must_use]
    pub const fn new(config: C) -> Self {
        Self {
            identity: None,
            config,
            prior: None,
        }
    }

    /// Start from a desired configuration that was previously stored.
    #[must_use]
    pub const fn with_prior(identity: SecretIdentity, config: C, prior: C) -> Self {
        Self {
            identity: Some(identity),
            config,
            prior: Some(prior),
        }
    }

    /// Start from an identity alone, for import.
    #[must_use]
    pub fn imported(identity: SecretIdentity) -> Self
    where
        C: Default,
    {
        Self {
            identity: Some(identity),
            config: C::default(),
            prior: None,
        }
    }

    /// Composite identity, once the resource exists remotely.
    #[must_use]
    pub const fn identity(&self) -> Option<&SecretIdentity> {
        self.identity.as_ref()
    }

    /// Record the identity of the remote secret.
    pub fn set_identity(&mut self, identity: SecretIdentity) {
        self.identity = Some(identity);
    }

    /// Forget the remote secret. The host runtime treats this as "gone".
    pub fn clear_identity(&mut self) {
        self.identity = None;
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Mutable access to the desired configuration.
    pub const fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }

    /// Last recorded state.
    #[must_use]
    pub const fn prior(&self) -> Option<&C> {
        self.prior.as_ref()
    }

    /// Whether the field selected by `field` differs from the last recorded
    /// state. Everything counts as changed before the first read.
    pub fn has_change<T, F>(&self, field: F) -> bool
    where
        T: PartialEq + ?Sized,
        F: Fn(&C) -> &T,
    {
        self.prior
            .as_ref()
            .is_none_or(|prior| field(prior) != field(&self.config))
    }

    /// Replace both the configuration and the recorded state.
    pub fn apply_state(&mut self, state: C)
    where
        C: Clone,
    {
        self.prior = Some(state.clone());
        self.config = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::InstanceLocation;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Sample {
        name: String,
        labels: Vec<String>,
    }

    fn identity() -> SecretIdentity {
        SecretIdentity::new(InstanceLocation::new("us-south", "inst"), "sec")
    }

    #[test]
    fn test_everything_changed_without_prior() {
        let data = ResourceData::new(Sample::default());
        assert!(data.has_change(|c: &Sample| &c.name));
        assert!(data.identity().is_none());
    }

    #[test]
    fn test_field_level_change_detection() {
        let stored = Sample {
            name: "a".to_string(),
            labels: vec!["x".to_string()],
        };
        let mut desired = stored.clone();
        desired.name = "b".to_string();

        let data = ResourceData::with_prior(identity(), desired, stored);
        assert!(data.has_change(|c: &Sample| &c.name));
        assert!(!data.has_change(|c: &Sample| &c.labels));
    }

    #[test]
    fn test_apply_state_resets_changes() {
        let mut data = ResourceData::new(Sample::default());
        data.apply_state(Sample {
            name: "n".to_string(),
            labels: Vec::new(),
        });
        assert!(!data.has_change(|c: &Sample| &c.name));
        assert_eq!(data.prior(), Some(data.config()));
    }

    #[test]
    fn test_clear_identity() {
        let mut data: ResourceData<Sample> = ResourceData::imported(identity());
        assert_eq!(data.identity(), Some(&identity()));
        data.clear_identity();
        assert!(data.identity().is_none());
    }
}
