//! Observer trait notified of instance lifecycle transitions.

use crate::types::InstanceId;

/// Receives lifecycle notifications from the instance controller.
///
/// Calls are made synchronously, some of them while the controller holds
/// its pool lock. Implementations must return quickly and must not call
/// back into the controller.
pub trait StatusDisplay: Send + Sync + std::fmt::Debug {
    /// Called once per instance at pool initialization.
    fn register_instance(&self, id: InstanceId, name: &str);

    /// Called when a party claims an instance.
    fn set_party_in_instance(&self, id: InstanceId, party_label: &str);

    /// Called with `true` on launch and `false` on release.
    fn mark_active(&self, id: InstanceId, active: bool);

    /// Called when the party leaves an instance.
    fn clear_party(&self, id: InstanceId);

    /// Called with a human-readable message when a run finishes.
    fn log_completion(&self, message: &str);
}
