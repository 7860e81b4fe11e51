//! Wire model shared by the signaling relay and its clients.

pub mod model;

pub use model::{
    ClientMessage, ErrorCode, FrameError, ParsePeerIdError, PeerId, Relayed, RoomId, ServerMessage,
    Signal, SignalKind, SignalingMessage,
};
