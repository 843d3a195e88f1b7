//! Shared types for the cloud-provider adapter boundary.

use serde::{Deserialize, Serialize};

/// Cloud-reported power state of a worker instance.
///
/// `None` (rather than a variant here) represents "never polled" at the
/// `Instance` layer; every variant below is a state the cloud has actually
/// reported at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    /// Instance requested but not yet serving.
    Pending,
    /// Instance is up and should be communicating.
    Running,
    /// Instance reported a provider-level error state.
    Error,
    /// Instance has been torn down.
    Terminated,
    /// Any power state the adapter doesn't otherwise model, carried through
    /// verbatim so policy can still see state *changes* even for states it
    /// doesn't reason about explicitly (e.g. a provider's transient
    /// `STOPPING` on the way back to `PENDING`).
    Other(String),
}

impl PowerState {
    /// Parse a provider's raw state string into a `PowerState`.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "ERROR" => Self::Error,
            "TERMINATED" | "SHUTTING-DOWN" | "SHUTTING_DOWN" => Self::Terminated,
            other => Self::Other(other.to_string()),
        }
    }
}

/// An opaque reference to a cloud-provider instance object.
///
/// Produced by [`super::CloudAdapter::resolve`] and cached on `Instance`;
/// nulled out (represented as `Option::None` on the owner) after confirmed
/// termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudHandle {
    /// The provider-assigned identifier this handle was resolved for.
    pub id: String,
    /// Spot/preemptible request identifier, if this instance was launched
    /// that way. Passed back to `terminate` so the adapter can cancel the
    /// spot request alongside the instance itself.
    pub spot_request_id: Option<String>,
}

impl CloudHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            spot_request_id: None,
        }
    }

    pub fn with_spot_request(mut self, spot_request_id: impl Into<String>) -> Self {
        self.spot_request_id = Some(spot_request_id.into());
        self
    }
}
