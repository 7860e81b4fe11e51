use sigrelay_core::{PeerId, RoomId, ServerMessage};
use tokio::sync::mpsc::{self, WeakSender, error::TrySendError};

/// Write side of a peer's bounded outbound queue.
///
/// The registry owns the only strong handle for a registered peer, so
/// dropping it on unregister lets the drain task flush and stop.
#[derive(Debug, Clone)]
pub struct PeerConnection {
    outbound: mpsc::Sender<ServerMessage>,
}

/// Outcome of a non-blocking enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Queue at capacity; the new message was dropped.
    Overflow,
    /// The connection is already gone.
    Closed,
}

impl PeerConnection {
    pub fn new(outbound: mpsc::Sender<ServerMessage>) -> Self {
        Self { outbound }
    }

    /// A connection handle plus the receiver its drain task reads from.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Handle that does not keep the queue open.
    pub fn downgrade(&self) -> WeakSender<ServerMessage> {
        self.outbound.downgrade()
    }

    /// Never waits: a full queue drops `message` instead of blocking the caller.
    pub fn enqueue(&self, message: ServerMessage) -> Delivery {
        match self.outbound.try_send(message) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => Delivery::Overflow,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

#[derive(Debug)]
pub struct Peer {
    pub(crate) id: PeerId,
    pub(crate) room: Option<RoomId>,
    pub(crate) connection: PeerConnection,
}

impl Peer {
    pub(crate) fn new(id: PeerId, connection: PeerConnection) -> Self {
        Self {
            id,
            room: None,
            connection,
        }
    }

    pub fn info(&self) -> PeerInfo {
        PeerInfo {
            id: self.id,
            room: self.room.clone(),
        }
    }
}

/// Snapshot of a peer returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub id: PeerId,
    pub room: Option<RoomId>,
}
