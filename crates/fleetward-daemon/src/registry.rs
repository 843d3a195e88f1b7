//! The mutable set of live [`Instance`]s owned by the master manager.
//!
//! Membership is the single source of truth for "does this worker still
//! count?" — the core mutates it only on successful termination and on
//! budget-exhausted drop.

use crate::instance::Instance;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cheap to clone; clones share the same underlying map.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    instances: Arc<Mutex<HashMap<String, Instance>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly provisioned worker. Out-of-scope provisioning logic
    /// calls this; the core itself never adds entries.
    pub fn insert(&self, instance: Instance) {
        self.instances
            .lock()
            .unwrap()
            .insert(instance.id().to_string(), instance);
    }

    pub fn get(&self, id: &str) -> Option<Instance> {
        self.instances.lock().unwrap().get(id).cloned()
    }

    /// Remove an instance. Called by a termination task on success, or by
    /// `Instance::maintain` when the termination budget is exhausted.
    pub fn remove(&self, id: &str) -> Option<Instance> {
        self.instances.lock().unwrap().remove(id)
    }

    /// A point-in-time copy of the membership, safe to iterate while other
    /// tasks concurrently remove entries. The monitor loop drives `maintain`
    /// from this rather than iterating the live map.
    pub fn snapshot(&self) -> Vec<Instance> {
        self.instances.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().unwrap().is_empty()
    }
}
