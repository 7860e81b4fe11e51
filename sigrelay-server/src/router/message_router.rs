use crate::error::RelayResult;
use crate::registry::RegistryHandle;
use sigrelay_core::{PeerId, SignalingMessage};
use tracing::debug;

/// Result of fanning one signal out to its recipients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Sends offers, answers and ICE candidates to the right members of the
/// sender's room. All three kinds take the same path.
#[derive(Clone)]
pub struct MessageRouter {
    registry: RegistryHandle,
}

impl MessageRouter {
    pub fn new(registry: RegistryHandle) -> Self {
        Self { registry }
    }

    /// Enqueues `message` for every recipient without waiting on any of them.
    ///
    /// A recipient with a full queue loses this message (newest-drop) and an
    /// overflow event is emitted; the others still receive it.
    pub async fn route(
        &self,
        sender: PeerId,
        mut message: SignalingMessage,
    ) -> RelayResult<RouteReport> {
        message.sender = sender;
        let kind = message.kind;
        let report = self.registry.route(message).await?;

        debug!(
            "Routed {} from {}: {} delivered, {} dropped",
            kind, sender, report.delivered, report.dropped
        );
        Ok(report)
    }
}
