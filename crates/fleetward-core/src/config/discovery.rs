//! Resolution of the typed [`Configuration`](super::Configuration) from an
//! untyped mapping.
//!
//! The source system keeps a single untyped user-data mapping (`ud`) and
//! merges a persisted cluster snapshot (`pd`, fetched from the cloud
//! provider's object store) onto it at startup, with the persisted snapshot
//! taking precedence over user-data for any key both define: recovered
//! cluster state should win over whatever the instance was launched with.
//! `resolve` reproduces that merge order, then does the single parse step
//! the ambient stack relies on instead of probing the mapping ad hoc at the
//! point of use.

use super::types::Configuration;
use crate::role::Role;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Resolution or validation failure while building a [`Configuration`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The merged mapping could not be parsed as TOML.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The merged mapping had no usable `role` key, or its value was
    /// neither `"master"` nor `"worker"`. Fatal: the system has no default
    /// role to dispatch to.
    #[error("configuration is missing a valid role: {0}")]
    MissingRole(String),
}

/// An untyped key/value mapping, as resolved from user-data or a persisted
/// cluster snapshot before it has been validated into a [`Configuration`].
///
/// Unknown keys are ignored by [`resolve`]; missing keys fall back to
/// [`Configuration`]'s defaults.
#[derive(Debug, Clone, Default)]
pub struct RawConfig(BTreeMap<String, toml::Value>);

impl RawConfig {
    /// An empty mapping.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Parse a TOML document into a raw mapping.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let table: BTreeMap<String, toml::Value> = toml::from_str(contents)?;
        Ok(Self(table))
    }

    /// Merge `overlay` onto `self`, `overlay` winning on key collisions.
    /// Mirrors the source system merging a persisted snapshot onto
    /// user-data.
    pub fn merge(mut self, overlay: RawConfig) -> RawConfig {
        for (key, value) in overlay.0 {
            self.0.insert(key, value);
        }
        self
    }

    fn get_duration_secs(&self, key: &str, default: Duration) -> Duration {
        match self.0.get(key).and_then(toml::Value::as_integer) {
            Some(secs) if secs >= 0 => Duration::from_secs(secs as u64),
            _ => default,
        }
    }

    fn get_u32(&self, key: &str, default: u32) -> u32 {
        match self.0.get(key).and_then(toml::Value::as_integer) {
            Some(n) if n >= 0 => n as u32,
            _ => default,
        }
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(toml::Value::as_str)
    }
}

/// Build the effective [`Configuration`] from user-data merged with a
/// persisted cluster snapshot, falling back to defaults for anything
/// neither mapping sets.
///
/// Fails only if `role` is absent or unrecognized; every other key is
/// optional.
pub fn resolve(user_data: RawConfig, persisted: RawConfig) -> Result<Configuration, ConfigError> {
    let merged = user_data.merge(persisted);

    let role_str = merged
        .get_str("role")
        .ok_or_else(|| ConfigError::MissingRole("no \"role\" key in configuration".to_string()))?;
    let role = Role::from_str(role_str).map_err(ConfigError::MissingRole)?;

    Ok(Configuration {
        instance_state_change_wait: merged.get_duration_secs(
            "instance_state_change_wait",
            Configuration::DEFAULT_INSTANCE_STATE_CHANGE_WAIT,
        ),
        instance_reboot_timeout: merged.get_duration_secs(
            "instance_reboot_timeout",
            Configuration::DEFAULT_INSTANCE_REBOOT_TIMEOUT,
        ),
        instance_reboot_attempts: merged.get_u32(
            "instance_reboot_attempts",
            Configuration::DEFAULT_INSTANCE_REBOOT_ATTEMPTS,
        ),
        instance_terminate_attempts: merged.get_u32(
            "instance_terminate_attempts",
            Configuration::DEFAULT_INSTANCE_TERMINATE_ATTEMPTS,
        ),
        instance_comm_timeout: merged.get_duration_secs(
            "instance_comm_timeout",
            Configuration::DEFAULT_INSTANCE_COMM_TIMEOUT,
        ),
        monitor_tick_interval: merged.get_duration_secs(
            "monitor_tick_interval",
            Configuration::DEFAULT_MONITOR_TICK_INTERVAL,
        ),
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_role_is_fatal() {
        let err = resolve(RawConfig::empty(), RawConfig::empty()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRole(_)));
    }

    #[test]
    fn unknown_keys_are_ignored_and_missing_keys_default() {
        let ud = RawConfig::from_toml_str(
            r#"
            role = "master"
            some_unknown_future_key = "ignored"
            "#,
        )
        .unwrap();

        let config = resolve(ud, RawConfig::empty()).unwrap();
        assert_eq!(config.role, Role::Master);
        assert_eq!(
            config.instance_reboot_timeout,
            Configuration::DEFAULT_INSTANCE_REBOOT_TIMEOUT
        );
    }

    #[test]
    fn persisted_snapshot_overrides_user_data() {
        let ud = RawConfig::from_toml_str(
            r#"
            role = "worker"
            instance_reboot_timeout = 300
            "#,
        )
        .unwrap();
        let pd = RawConfig::from_toml_str(
            r#"
            role = "master"
            instance_reboot_timeout = 500
            "#,
        )
        .unwrap();

        let config = resolve(ud, pd).unwrap();
        assert_eq!(config.role, Role::Master);
        assert_eq!(config.instance_reboot_timeout, Duration::from_secs(500));
    }

    #[test]
    fn rejects_unrecognized_role() {
        let ud = RawConfig::from_toml_str(r#"role = "supervisor""#).unwrap();
        let err = resolve(ud, RawConfig::empty()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRole(_)));
    }

    #[test]
    fn overridden_reboot_timeout_changes_cadence() {
        let ud = RawConfig::from_toml_str(
            r#"
            role = "master"
            instance_reboot_timeout = 500
            instance_state_change_wait = 700
            "#,
        )
        .unwrap();

        let config = resolve(ud, RawConfig::empty()).unwrap();
        assert_eq!(config.instance_reboot_timeout, Duration::from_secs(500));
        assert_eq!(config.instance_state_change_wait, Duration::from_secs(700));
    }
}
