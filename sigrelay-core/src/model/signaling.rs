use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The three negotiation messages the relay forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an inbound offer, answer or ICE candidate.
///
/// `payload` is the SDP or ICE blob and is never inspected. `target` is kept
/// as sent; resolving it against the room happens at routing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub payload: Value,
}

/// Frames sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join { room: RoomId },
    Leave,
    Offer(Signal),
    Answer(Signal),
    IceCandidate(Signal),
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("room name must not be empty")]
    EmptyRoom,

    #[error("{0} frame is missing its payload")]
    MissingPayload(SignalKind),
}

impl ClientMessage {
    /// Parses one text frame and checks the few things the relay cares about:
    /// a usable room name on `join` and a present payload on signals.
    pub fn from_json(text: &str) -> Result<Self, FrameError> {
        let message: ClientMessage = serde_json::from_str(text)?;

        if let ClientMessage::Join { room } = &message
            && !room.is_valid()
        {
            return Err(FrameError::EmptyRoom);
        }
        if let (Some(kind), Some(signal)) = (message.signal_kind(), message.signal())
            && signal.payload.is_null()
        {
            return Err(FrameError::MissingPayload(kind));
        }
        Ok(message)
    }

    pub fn signal(&self) -> Option<&Signal> {
        match self {
            ClientMessage::Offer(s) | ClientMessage::Answer(s) | ClientMessage::IceCandidate(s) => {
                Some(s)
            }
            ClientMessage::Join { .. } | ClientMessage::Leave => None,
        }
    }

    pub fn signal_kind(&self) -> Option<SignalKind> {
        match self {
            ClientMessage::Offer(_) => Some(SignalKind::Offer),
            ClientMessage::Answer(_) => Some(SignalKind::Answer),
            ClientMessage::IceCandidate(_) => Some(SignalKind::IceCandidate),
            ClientMessage::Join { .. } | ClientMessage::Leave => None,
        }
    }

    /// Attaches the sender to a signal frame. `join` and `leave` yield `None`.
    pub fn into_signaling(self, sender: PeerId) -> Option<SignalingMessage> {
        let kind = self.signal_kind()?;
        match self {
            ClientMessage::Offer(signal)
            | ClientMessage::Answer(signal)
            | ClientMessage::IceCandidate(signal) => Some(SignalingMessage {
                kind,
                sender,
                target: signal.target,
                payload: signal.payload,
            }),
            ClientMessage::Join { .. } | ClientMessage::Leave => None,
        }
    }
}

/// A signal after the relay has stamped it with its sender.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalingMessage {
    pub kind: SignalKind,
    pub sender: PeerId,
    /// Raw target id from the frame; may not name any peer at all.
    pub target: Option<String>,
    pub payload: Value,
}

impl SignalingMessage {
    /// The frame recipients get, carrying the target it was resolved to.
    pub fn into_relayed(self, target: Option<PeerId>) -> ServerMessage {
        let relayed = Relayed {
            sender: self.sender,
            target,
            payload: self.payload,
        };
        match self.kind {
            SignalKind::Offer => ServerMessage::Offer(relayed),
            SignalKind::Answer => ServerMessage::Answer(relayed),
            SignalKind::IceCandidate => ServerMessage::IceCandidate(relayed),
        }
    }
}

/// Signal as delivered to a recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relayed {
    pub sender: PeerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PeerId>,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RegistryFull,
    AlreadyInRoom,
    NotInRoom,
    UnknownPeer,
    UnknownTarget,
    ProtocolError,
}

/// Frames sent by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Joined {
        peer_id: PeerId,
        room: RoomId,
        peers: Vec<PeerId>,
    },
    Left {
        room: RoomId,
    },
    PeerJoined {
        peer_id: PeerId,
    },
    PeerLeft {
        peer_id: PeerId,
    },
    Offer(Relayed),
    Answer(Relayed),
    IceCandidate(Relayed),
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code,
            message: message.into(),
        }
    }

    pub fn signal_kind(&self) -> Option<SignalKind> {
        match self {
            ServerMessage::Offer(_) => Some(SignalKind::Offer),
            ServerMessage::Answer(_) => Some(SignalKind::Answer),
            ServerMessage::IceCandidate(_) => Some(SignalKind::IceCandidate),
            _ => None,
        }
    }
}
