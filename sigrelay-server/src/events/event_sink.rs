use crate::events::RelayEvent;
use tracing::{info, warn};

/// Receiver for lifecycle events. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RelayEvent);
}

/// Writes every event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: RelayEvent) {
        match event {
            RelayEvent::Connected { peer } => info!(%peer, "peer connected"),
            RelayEvent::Joined { peer, room } => info!(%peer, %room, "peer joined room"),
            RelayEvent::Left { peer, room } => info!(%peer, %room, "peer left room"),
            RelayEvent::Disconnected { peer, reason } => {
                info!(%peer, reason = reason.as_str(), "peer disconnected")
            }
            RelayEvent::QueueOverflow { peer } => {
                warn!(%peer, "outbound queue full, message dropped")
            }
            RelayEvent::ProtocolViolation { peer, consecutive } => {
                warn!(%peer, consecutive, "malformed frame dropped")
            }
        }
    }
}
