//! Worker-instance lifecycle manager: the per-worker health-and-recovery
//! state machine, its registry, and the master/worker dispatch that drives
//! it.

pub mod instance;
pub mod manager;
pub mod monitor;
pub mod registry;
mod termination;

pub use instance::Instance;
pub use manager::Manager;
pub use registry::WorkerRegistry;
