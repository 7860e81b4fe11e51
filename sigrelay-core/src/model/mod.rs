mod peer;
mod room;
mod signaling;

pub use peer::{ParsePeerIdError, PeerId};
pub use room::RoomId;
pub use signaling::{
    ClientMessage, ErrorCode, FrameError, Relayed, ServerMessage, Signal, SignalKind, SignalingMessage,
};
