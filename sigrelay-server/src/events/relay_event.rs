use sigrelay_core::{PeerId, RoomId};

/// Connection lifecycle events handed to the observability sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Connected { peer: PeerId },
    Joined { peer: PeerId, room: RoomId },
    Left { peer: PeerId, room: RoomId },
    Disconnected { peer: PeerId, reason: DisconnectReason },
    /// A message for `peer` was dropped because its outbound queue was full.
    QueueOverflow { peer: PeerId },
    ProtocolViolation { peer: PeerId, consecutive: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    ClientClosed,
    ReadError,
    WriteError,
    IdleTimeout,
    ProtocolViolations,
    /// The registry stopped; the relay is going down.
    Shutdown,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::ClientClosed => "client-closed",
            DisconnectReason::ReadError => "read-error",
            DisconnectReason::WriteError => "write-error",
            DisconnectReason::IdleTimeout => "idle-timeout",
            DisconnectReason::ProtocolViolations => "protocol-violations",
            DisconnectReason::Shutdown => "shutdown",
        }
    }
}
