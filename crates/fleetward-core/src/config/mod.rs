//! Configuration resolution.
//!
//! An untyped [`RawConfig`] mapping (user-data merged with a persisted
//! cluster snapshot) is resolved once, at startup, into a typed
//! [`Configuration`] record. See [`resolve`] for the merge order.

mod discovery;
mod types;

pub use discovery::{resolve, ConfigError, RawConfig};
pub use types::Configuration;
