//! Error taxonomy at the cloud-provider boundary.

use thiserror::Error;

/// Failures the `CloudAdapter` boundary can raise into `Instance`.
///
/// Mutation failures (reboot/terminate) are deliberately not modeled as a
/// third variant here: `reboot` never raises (errors are logged by the
/// adapter and policy just sees no state change), and `terminate` reports
/// failure as a `bool`, not an `Err`, per the provider boundary contract.
#[derive(Debug, Error)]
pub enum CloudError {
    /// The provider cannot locate the instance. `maintain` swallows this for
    /// the current tick and retries next tick.
    #[error("cloud provider could not locate instance {id}: {message}")]
    Lookup { id: String, message: String },
}
