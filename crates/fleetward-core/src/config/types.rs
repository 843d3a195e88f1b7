//! The typed, defaulted configuration record the core actually reads.
//!
//! [`super::RawConfig`] is the untyped merged mapping (user-data merged with
//! a persisted cluster snapshot); `Configuration` is the enumerated record,
//! resolved from it once at startup, with explicit defaults that the rest of
//! the crate actually consumes.

use crate::role::Role;
use std::time::Duration;

/// Effective policy thresholds for the worker-instance lifecycle manager.
///
/// Every duration field defaults to the value in the system overview; any
/// subset may be overridden by the resolved configuration mapping. Unknown
/// keys in that mapping are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    /// Grace period after the last observed state change before stuck-state
    /// logic may fire.
    pub instance_state_change_wait: Duration,
    /// Minimum interval between two reboots of the same instance.
    pub instance_reboot_timeout: Duration,
    /// Max reboots before escalating to termination.
    pub instance_reboot_attempts: u32,
    /// Max termination attempts before the instance is dropped from the
    /// registry without confirmed termination.
    pub instance_terminate_attempts: u32,
    /// Max silence from a `RUNNING` worker before it is considered
    /// communication-lost.
    pub instance_comm_timeout: Duration,
    /// Cadence of the monitor loop. Not a recovery threshold, but still
    /// resolved through the same mapping so a deployment can tune it
    /// without a redeploy.
    pub monitor_tick_interval: Duration,
    /// Which manager kind this process runs as. Fatal if absent from the
    /// resolved mapping (see `ConfigError::MissingRole`).
    pub role: Role,
}

impl Configuration {
    pub const DEFAULT_INSTANCE_STATE_CHANGE_WAIT: Duration = Duration::from_secs(400);
    pub const DEFAULT_INSTANCE_REBOOT_TIMEOUT: Duration = Duration::from_secs(300);
    pub const DEFAULT_INSTANCE_REBOOT_ATTEMPTS: u32 = 4;
    pub const DEFAULT_INSTANCE_TERMINATE_ATTEMPTS: u32 = 4;
    pub const DEFAULT_INSTANCE_COMM_TIMEOUT: Duration = Duration::from_secs(300);
    pub const DEFAULT_MONITOR_TICK_INTERVAL: Duration = Duration::from_secs(10);

    /// A `Configuration` with every threshold at its default and the given
    /// `role`. Production code should go through [`super::resolve`] instead,
    /// which layers a `RawConfig` mapping on top of these defaults.
    pub fn with_defaults(role: Role) -> Self {
        Self {
            instance_state_change_wait: Self::DEFAULT_INSTANCE_STATE_CHANGE_WAIT,
            instance_reboot_timeout: Self::DEFAULT_INSTANCE_REBOOT_TIMEOUT,
            instance_reboot_attempts: Self::DEFAULT_INSTANCE_REBOOT_ATTEMPTS,
            instance_terminate_attempts: Self::DEFAULT_INSTANCE_TERMINATE_ATTEMPTS,
            instance_comm_timeout: Self::DEFAULT_INSTANCE_COMM_TIMEOUT,
            monitor_tick_interval: Self::DEFAULT_MONITOR_TICK_INTERVAL,
            role,
        }
    }
}
