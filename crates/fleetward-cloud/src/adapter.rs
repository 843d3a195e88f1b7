//! Provider-agnostic cloud operations the core state machine depends on.

use super::error::CloudError;
use super::types::{CloudHandle, PowerState};
use fleetward_core::config::RawConfig;
use std::future::Future;
use std::pin::Pin;

/// Async capability set a cloud provider (or a mock, for tests) must
/// implement. Uses RPITIT with explicit `Send` bounds so a single trait
/// definition works whether the caller wants to `.await` it directly or
/// store it behind `dyn` via [`ErasedCloudAdapter`].
pub trait CloudAdapter: Send + Sync + std::fmt::Debug {
    /// Resolve the current provider-side object for `id`.
    fn resolve(&self, id: &str) -> impl Future<Output = Result<CloudHandle, CloudError>> + Send;

    /// Read the cloud-reported power state of an already-resolved handle.
    fn state_of(&self, handle: &CloudHandle) -> impl Future<Output = PowerState> + Send;

    /// Issue an asynchronous reboot. Fire-and-forget at this layer: errors
    /// are logged by the adapter, never raised into the core.
    fn reboot(&self, handle: &CloudHandle) -> impl Future<Output = ()> + Send;

    /// Attempt to terminate the instance (and cancel its spot request, if
    /// any). Returns success/failure; never raises.
    fn terminate(
        &self,
        id: &str,
        spot_request_id: Option<&str>,
    ) -> impl Future<Output = bool> + Send;

    /// Read the provider's user-data mapping once, at startup.
    fn user_data(&self) -> impl Future<Output = Result<RawConfig, CloudError>> + Send;

    /// Provider name for logging/display.
    fn provider_name(&self) -> &str;
}

/// Object-safe counterpart of [`CloudAdapter`], implemented automatically
/// for every type that implements it. Lets `Instance` hold a
/// `Arc<dyn ErasedCloudAdapter>` chosen once at startup instead of being
/// generic over the concrete provider.
pub trait ErasedCloudAdapter: Send + Sync + std::fmt::Debug {
    fn resolve<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<CloudHandle, CloudError>> + Send + 'a>>;

    fn state_of<'a>(
        &'a self,
        handle: &'a CloudHandle,
    ) -> Pin<Box<dyn Future<Output = PowerState> + Send + 'a>>;

    fn reboot<'a>(&'a self, handle: &'a CloudHandle) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    fn terminate<'a>(
        &'a self,
        id: &'a str,
        spot_request_id: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

    fn user_data<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<RawConfig, CloudError>> + Send + 'a>>;

    fn provider_name(&self) -> &str;
}

impl<T: CloudAdapter> ErasedCloudAdapter for T {
    fn resolve<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<CloudHandle, CloudError>> + Send + 'a>> {
        Box::pin(CloudAdapter::resolve(self, id))
    }

    fn state_of<'a>(
        &'a self,
        handle: &'a CloudHandle,
    ) -> Pin<Box<dyn Future<Output = PowerState> + Send + 'a>> {
        Box::pin(CloudAdapter::state_of(self, handle))
    }

    fn reboot<'a>(&'a self, handle: &'a CloudHandle) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(CloudAdapter::reboot(self, handle))
    }

    fn terminate<'a>(
        &'a self,
        id: &'a str,
        spot_request_id: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(CloudAdapter::terminate(self, id, spot_request_id))
    }

    fn user_data<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<RawConfig, CloudError>> + Send + 'a>> {
        Box::pin(CloudAdapter::user_data(self))
    }

    fn provider_name(&self) -> &str {
        CloudAdapter::provider_name(self)
    }
}
