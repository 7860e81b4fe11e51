use sigrelay_core::{ErrorCode, PeerId, RoomId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("relay is full ({max} connections)")]
    RegistryFull { max: usize },

    #[error("already in room '{0}', leave it first")]
    AlreadyInRoom(RoomId),

    #[error("join a room before sending signals")]
    NotInRoom,

    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),

    /// Holds the target as the client sent it, which may not be a peer id.
    #[error("peer '{0}' is not in this room")]
    UnknownTarget(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    /// Only reported to the event sink, never to the sender.
    #[error("outbound queue of {0} is full")]
    QueueOverflow(PeerId),

    #[error("registry task is no longer running")]
    RegistryClosed,
}

impl RelayError {
    /// Wire code for the `error` frame. `None` for errors a client never sees.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            RelayError::RegistryFull { .. } => Some(ErrorCode::RegistryFull),
            RelayError::AlreadyInRoom(_) => Some(ErrorCode::AlreadyInRoom),
            RelayError::NotInRoom => Some(ErrorCode::NotInRoom),
            RelayError::UnknownPeer(_) => Some(ErrorCode::UnknownPeer),
            RelayError::UnknownTarget(_) => Some(ErrorCode::UnknownTarget),
            RelayError::Protocol(_) => Some(ErrorCode::ProtocolError),
            RelayError::QueueOverflow(_) | RelayError::RegistryClosed => None,
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
