//! The per-worker health-and-recovery state machine.
//!
//! Mutable fields are guarded by a single per-instance lock (monitor,
//! message-dispatch, and termination paths all go through it); the
//! concurrency model only requires writes be linearizable per instance; see
//! the module-level ordering guarantees in the system design.

use crate::registry::WorkerRegistry;
use crate::termination;
use fleetward_cloud::{CloudError, CloudHandle, ErasedCloudAdapter, PowerState};
use fleetward_core::clock::{Clock, Timestamp};
use fleetward_core::config::Configuration;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

struct MutableState {
    cloud_handle: Option<CloudHandle>,
    m_state: Option<PowerState>,
    last_m_state_change: Timestamp,
    time_rebooted: Timestamp,
    reboot_count: u32,
    terminate_attempt_count: u32,
    last_comm: Timestamp,
}

struct Inner {
    id: String,
    config: Configuration,
    clock: Arc<dyn Clock>,
    cloud: Arc<dyn ErasedCloudAdapter>,
    state: Mutex<MutableState>,
}

/// One rented worker VM under supervision.
///
/// Cheap to clone: clones share the same underlying state (`Arc`), which is
/// what lets a spawned termination task keep a handle to the instance that
/// launched it.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<Inner>,
}

impl Instance {
    pub fn new(
        id: impl Into<String>,
        config: Configuration,
        clock: Arc<dyn Clock>,
        cloud: Arc<dyn ErasedCloudAdapter>,
    ) -> Self {
        let far_past = Timestamp::FAR_PAST;
        Self {
            inner: Arc::new(Inner {
                id: id.into(),
                config,
                clock,
                cloud,
                state: Mutex::new(MutableState {
                    cloud_handle: None,
                    m_state: None,
                    last_m_state_change: far_past,
                    time_rebooted: far_past,
                    reboot_count: 0,
                    terminate_attempt_count: 0,
                    last_comm: far_past,
                }),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn reboot_count(&self) -> u32 {
        self.inner.state.lock().unwrap().reboot_count
    }

    pub fn terminate_attempt_count(&self) -> u32 {
        self.inner.state.lock().unwrap().terminate_attempt_count
    }

    pub fn cloud_handle(&self) -> Option<CloudHandle> {
        self.inner.state.lock().unwrap().cloud_handle.clone()
    }

    /// `(spot_request_id, cloud adapter)` — what the termination task needs
    /// to issue its own call without holding the instance lock.
    pub(crate) fn termination_inputs(&self) -> (Option<String>, Arc<dyn ErasedCloudAdapter>) {
        let spot_request_id = self
            .inner
            .state
            .lock()
            .unwrap()
            .cloud_handle
            .as_ref()
            .and_then(|h| h.spot_request_id.clone());
        (spot_request_id, self.inner.cloud.clone())
    }

    pub(crate) fn mark_terminated(&self) {
        self.inner.state.lock().unwrap().cloud_handle = None;
    }

    /// Cached handle (no I/O) or a freshly resolved one.
    ///
    /// Fails with `CloudError::Lookup` if `deep` and the adapter cannot find
    /// the instance; the cached handle is left untouched on failure.
    pub async fn get_cloud_instance_object(
        &self,
        deep: bool,
    ) -> Result<Option<CloudHandle>, CloudError> {
        if !deep {
            return Ok(self.inner.state.lock().unwrap().cloud_handle.clone());
        }

        let handle = self.inner.cloud.resolve(&self.inner.id).await?;
        self.inner.state.lock().unwrap().cloud_handle = Some(handle.clone());
        Ok(Some(handle))
    }

    /// Deep fetch plus `state_of`; updates `m_state`/`last_m_state_change`
    /// iff the observed state differs from the cached one.
    pub async fn get_m_state(&self) -> Result<PowerState, CloudError> {
        let handle = self
            .get_cloud_instance_object(true)
            .await?
            .expect("resolve always yields a handle on success");

        let observed = self.inner.cloud.state_of(&handle).await;

        let mut state = self.inner.state.lock().unwrap();
        if state.m_state.as_ref() != Some(&observed) {
            state.m_state = Some(observed.clone());
            state.last_m_state_change = self.inner.clock.now();
        }
        Ok(observed)
    }

    /// Issue an asynchronous reboot. Increments `reboot_count` and resets
    /// `time_rebooted` unconditionally, even for a reboot issued during an
    /// already-unhealthy episode.
    pub async fn reboot(&self) {
        let handle = self
            .inner
            .state
            .lock()
            .unwrap()
            .cloud_handle
            .clone()
            .unwrap_or_else(|| CloudHandle::new(self.inner.id.clone()));

        self.inner.cloud.reboot(&handle).await;

        let mut state = self.inner.state.lock().unwrap();
        state.time_rebooted = self.inner.clock.now();
        state.reboot_count += 1;
    }

    /// Launch a background termination task and return its handle. Returns
    /// immediately; `terminate_attempt_count` is incremented synchronously,
    /// before any I/O, so a second `maintain` tick racing the background
    /// task still observes the correct count.
    pub fn terminate(&self, registry: WorkerRegistry) -> JoinHandle<()> {
        self.inner.state.lock().unwrap().terminate_attempt_count += 1;
        termination::spawn(self.clone(), registry)
    }

    /// Record inbound application-level contact. The only field the
    /// message-dispatch path writes.
    pub fn handle_message(&self) {
        self.inner.state.lock().unwrap().last_comm = self.inner.clock.now();
    }

    /// One `maintain` tick: one fresh observation, at most one corrective
    /// action. Returns the termination task's handle when rule 1 launches
    /// one, so tests can await it instead of sleeping.
    pub async fn maintain(&self, registry: &WorkerRegistry) -> Option<JoinHandle<()>> {
        let observed = match self.get_m_state().await {
            Ok(state) => state,
            Err(_) => return None,
        };

        let now = self.inner.clock.now();
        let (reboot_count, terminate_attempt_count, last_m_state_change, time_rebooted, last_comm) = {
            let state = self.inner.state.lock().unwrap();
            (
                state.reboot_count,
                state.terminate_attempt_count,
                state.last_m_state_change,
                state.time_rebooted,
                state.last_comm,
            )
        };

        let config = &self.inner.config;

        // Rule 1: terminal escalation past reboot budget.
        if reboot_count >= config.instance_reboot_attempts {
            return if terminate_attempt_count < config.instance_terminate_attempts {
                Some(self.terminate(registry.clone()))
            } else {
                registry.remove(&self.inner.id);
                None
            };
        }

        // Rule 2: stuck in a non-RUNNING state.
        if observed != PowerState::Running {
            let state_change_grace_elapsed =
                now.elapsed_since(last_m_state_change) >= config.instance_state_change_wait;
            let reboot_cooldown_elapsed =
                now.elapsed_since(time_rebooted) >= config.instance_reboot_timeout;
            let grace_satisfied = state_change_grace_elapsed || observed == PowerState::Error;

            if grace_satisfied && reboot_cooldown_elapsed {
                self.reboot().await;
            }
            return None;
        }

        // Rule 3: silent RUNNING instance.
        if now.elapsed_since(last_comm) >= config.instance_comm_timeout
            && now.elapsed_since(time_rebooted) >= config.instance_reboot_timeout
        {
            self.reboot().await;
        }

        // Rule 4: healthy; fall through with no action.
        None
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock().unwrap();
        f.debug_struct("Instance")
            .field("id", &self.inner.id)
            .field("m_state", &state.m_state)
            .field("reboot_count", &state.reboot_count)
            .field("terminate_attempt_count", &state.terminate_attempt_count)
            .finish()
    }
}
