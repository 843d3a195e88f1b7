//! Master/worker role dispatch.
//!
//! The bootstrap collaborator reads a `role` key out of the resolved
//! configuration and picks a manager kind once, at construction time; the
//! core never re-enters this decision at runtime.

use std::fmt;
use std::str::FromStr;

/// Which manager kind this process should run as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns the `WorkerRegistry` and runs the monitor loop.
    Master,
    /// Supervised side; does not instantiate a registry or monitor loop.
    Worker,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Self::Master),
            "worker" => Ok(Self::Worker),
            other => Err(format!("unrecognized role {other:?}, expected \"master\" or \"worker\"")),
        }
    }
}
