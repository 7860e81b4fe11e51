use crate::error::RelayResult;
use crate::registry::{PeerConnection, PeerInfo, RegistryStats};
use crate::router::RouteReport;
use sigrelay_core::{PeerId, RoomId, SignalingMessage};
use std::collections::HashSet;
use tokio::sync::oneshot;

/// Requests handled one at a time by the registry task.
#[derive(Debug)]
pub enum RegistryCommand {
    Register {
        connection: PeerConnection,
        reply: oneshot::Sender<RelayResult<PeerId>>,
    },

    Join {
        peer_id: PeerId,
        room: RoomId,
        reply: oneshot::Sender<RelayResult<Vec<PeerId>>>,
    },

    Leave {
        peer_id: PeerId,
        reply: oneshot::Sender<Option<RoomId>>,
    },

    Unregister {
        peer_id: PeerId,
        reply: oneshot::Sender<RelayResult<()>>,
    },

    MembersOf {
        room: RoomId,
        reply: oneshot::Sender<HashSet<PeerId>>,
    },

    PeerOf {
        peer_id: PeerId,
        reply: oneshot::Sender<RelayResult<PeerInfo>>,
    },

    /// Resolves and enqueues a signal in one step.
    Route {
        message: SignalingMessage,
        reply: oneshot::Sender<RelayResult<RouteReport>>,
    },

    Stats {
        reply: oneshot::Sender<RegistryStats>,
    },
}
