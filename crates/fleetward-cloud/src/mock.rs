//! Mock cloud adapter for deterministic tests: returns canned power states
//! and terminate outcomes, and logs every call so tests can assert on what
//! the core actually invoked.

use super::adapter::CloudAdapter;
use super::error::CloudError;
use super::types::{CloudHandle, PowerState};
use fleetward_core::config::RawConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Record of a single call made against a [`MockCloudAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Resolve(String),
    StateOf(String),
    Reboot(String),
    Terminate(String),
}

/// A `CloudAdapter` that never touches a real provider. Power states are
/// seeded per instance id with [`MockCloudAdapter::set_state`]; `terminate`
/// always returns whatever [`MockCloudAdapter::set_terminate_result`] last
/// configured (default: success).
#[derive(Debug, Clone)]
pub struct MockCloudAdapter {
    states: Arc<Mutex<HashMap<String, PowerState>>>,
    resolve_fails: Arc<Mutex<bool>>,
    terminate_succeeds: Arc<Mutex<bool>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockCloudAdapter {
    pub fn new() -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            resolve_fails: Arc::new(Mutex::new(false)),
            terminate_succeeds: Arc::new(Mutex::new(true)),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Seed (or change) the power state `state_of` reports for `id`.
    pub fn set_state(&self, id: impl Into<String>, state: PowerState) {
        self.states.lock().unwrap().insert(id.into(), state);
    }

    /// Make `resolve` fail with `CloudError::Lookup` for every id.
    pub fn set_resolve_fails(&self, fails: bool) {
        *self.resolve_fails.lock().unwrap() = fails;
    }

    /// Control what every subsequent `terminate` call returns.
    pub fn set_terminate_result(&self, succeeds: bool) {
        *self.terminate_succeeds.lock().unwrap() = succeeds;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear();
    }

    fn log(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }
}

impl Default for MockCloudAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudAdapter for MockCloudAdapter {
    async fn resolve(&self, id: &str) -> Result<CloudHandle, CloudError> {
        self.log(MockCall::Resolve(id.to_string()));

        if *self.resolve_fails.lock().unwrap() {
            return Err(CloudError::Lookup {
                id: id.to_string(),
                message: "mock adapter configured to fail resolve".to_string(),
            });
        }

        Ok(CloudHandle::new(id))
    }

    async fn state_of(&self, handle: &CloudHandle) -> PowerState {
        self.log(MockCall::StateOf(handle.id.clone()));

        self.states
            .lock()
            .unwrap()
            .get(&handle.id)
            .cloned()
            .unwrap_or(PowerState::Pending)
    }

    async fn reboot(&self, handle: &CloudHandle) {
        self.log(MockCall::Reboot(handle.id.clone()));
    }

    async fn terminate(&self, id: &str, _spot_request_id: Option<&str>) -> bool {
        self.log(MockCall::Terminate(id.to_string()));
        *self.terminate_succeeds.lock().unwrap()
    }

    async fn user_data(&self) -> Result<RawConfig, CloudError> {
        Ok(RawConfig::empty())
    }

    fn provider_name(&self) -> &str {
        "MockCloudAdapter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_logs_call_and_succeeds_by_default() {
        let adapter = MockCloudAdapter::new();
        let handle = adapter.resolve("i-1").await.unwrap();
        assert_eq!(handle.id, "i-1");
        assert_eq!(adapter.calls(), vec![MockCall::Resolve("i-1".to_string())]);
    }

    #[tokio::test]
    async fn resolve_fails_when_configured() {
        let adapter = MockCloudAdapter::new();
        adapter.set_resolve_fails(true);
        assert!(adapter.resolve("i-1").await.is_err());
    }

    #[tokio::test]
    async fn state_of_defaults_to_pending_then_reflects_seeded_state() {
        let adapter = MockCloudAdapter::new();
        let handle = CloudHandle::new("i-1");
        assert_eq!(adapter.state_of(&handle).await, PowerState::Pending);

        adapter.set_state("i-1", PowerState::Running);
        assert_eq!(adapter.state_of(&handle).await, PowerState::Running);
    }

    #[tokio::test]
    async fn terminate_respects_configured_result() {
        let adapter = MockCloudAdapter::new();
        assert!(adapter.terminate("i-1", None).await);

        adapter.set_terminate_result(false);
        assert!(!adapter.terminate("i-1", None).await);
        assert_eq!(
            adapter.calls().len(),
            2,
            "both terminate calls should be logged"
        );
    }

    #[tokio::test]
    async fn clear_calls_empties_the_log() {
        let adapter = MockCloudAdapter::new();
        let _ = adapter.resolve("i-1").await;
        assert_eq!(adapter.calls().len(), 1);
        adapter.clear_calls();
        assert!(adapter.calls().is_empty());
    }
}
