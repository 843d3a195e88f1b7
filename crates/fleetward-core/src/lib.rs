//! Shared primitives for the fleetward worker-instance lifecycle manager.
//!
//! This crate has no knowledge of any particular cloud provider or of the
//! `Instance` state machine. It provides the things every other fleetward
//! crate needs: a typed, defaulted `Configuration`, an injectable `Clock`,
//! the master/worker `Role` tag, and process-wide logging setup.

pub mod clock;
pub mod config;
pub mod logging;
pub mod role;

pub use clock::{Clock, SystemClock, TestClock};
pub use config::{Configuration, ConfigError, RawConfig};
pub use role::Role;
