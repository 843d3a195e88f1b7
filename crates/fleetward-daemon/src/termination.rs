//! The background termination task `Instance::terminate` launches.
//!
//! One short-lived task per termination attempt: start it, hand the caller
//! something joinable, let it settle on its own.

use crate::instance::Instance;
use crate::registry::WorkerRegistry;
use tokio::task::JoinHandle;

pub(crate) fn spawn(instance: Instance, registry: WorkerRegistry) -> JoinHandle<()> {
    tokio::spawn(async move {
        let id = instance.id().to_string();
        let (spot_request_id, cloud) = instance.termination_inputs();

        let succeeded = cloud.terminate(&id, spot_request_id.as_deref()).await;

        if succeeded {
            instance.mark_terminated();
            registry.remove(&id);
        } else {
            tracing::warn!(
                instance_id = %id,
                attempt = instance.terminate_attempt_count(),
                "termination attempt failed, retrying on a later maintain tick"
            );
        }
    })
}
