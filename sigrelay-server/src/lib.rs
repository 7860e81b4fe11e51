//! Room-scoped WebRTC signaling relay.
//!
//! Peers connect over WebSocket, join a room and exchange offers, answers and
//! ICE candidates with the other members. Payloads are forwarded untouched.

pub mod config;
pub mod error;
pub mod events;
pub mod registry;
pub mod room;
pub mod router;
pub mod transport;

pub use config::*;
pub use error::*;
pub use events::*;
pub use registry::*;
pub use room::*;
pub use router::*;
pub use transport::*;
