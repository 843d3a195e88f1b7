//! The cloud-provider boundary: `CloudAdapter`, its object-safe erasure,
//! a concrete HTTP implementation, and a mock for tests.
//!
//! Nothing in this crate knows about `Instance` or the recovery policy in
//! `fleetward-daemon`; it only exposes the capability set a worker-instance
//! lifecycle manager needs from an IaaS provider.

mod adapter;
mod error;
mod http_adapter;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use adapter::{CloudAdapter, ErasedCloudAdapter};
pub use error::CloudError;
pub use http_adapter::HttpCloudAdapter;
pub use types::{CloudHandle, PowerState};
