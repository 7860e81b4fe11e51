use crate::error::{RelayError, RelayResult};
use crate::events::{EventSink, RelayEvent};
use crate::registry::peer::{Delivery, Peer, PeerConnection, PeerInfo};
use crate::room::Room;
use crate::router::RouteReport;
use serde::Serialize;
use sigrelay_core::{PeerId, RoomId, ServerMessage, SignalingMessage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Live peers and the rooms they are in.
///
/// Plain synchronous state; [`RegistryActor`](crate::RegistryActor) is the
/// only thing that mutates it at runtime.
pub struct Registry {
    peers: HashMap<PeerId, Peer>,
    rooms: HashMap<RoomId, Room>,
    max_connections: usize,
    events: Arc<dyn EventSink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub peers: usize,
    pub rooms: usize,
}

impl Registry {
    pub fn new(max_connections: usize, events: Arc<dyn EventSink>) -> Self {
        Self {
            peers: HashMap::new(),
            rooms: HashMap::new(),
            max_connections,
            events,
        }
    }

    pub fn register(&mut self, connection: PeerConnection) -> RelayResult<PeerId> {
        if self.peers.len() >= self.max_connections {
            return Err(RelayError::RegistryFull {
                max: self.max_connections,
            });
        }

        let mut peer_id = PeerId::new();
        while self.peers.contains_key(&peer_id) {
            peer_id = PeerId::new();
        }

        self.peers.insert(peer_id, Peer::new(peer_id, connection));
        debug!("Registered peer {} ({} live)", peer_id, self.peers.len());
        Ok(peer_id)
    }

    /// Adds the peer to `room_id`, creating the room if needed.
    ///
    /// The joiner is sent `joined` with the members already present, and those
    /// members are sent `peer-joined`. Returns the members already present.
    pub fn join(&mut self, peer_id: PeerId, room_id: RoomId) -> RelayResult<Vec<PeerId>> {
        let peer = self
            .peers
            .get_mut(&peer_id)
            .ok_or(RelayError::UnknownPeer(peer_id))?;
        if let Some(current) = &peer.room {
            return Err(RelayError::AlreadyInRoom(current.clone()));
        }
        peer.room = Some(room_id.clone());

        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Creating room '{}'", room_id);
            Room::new(room_id.clone())
        });
        let existing = room.others(&peer_id);
        room.insert(peer_id);
        debug!("Peer {} joined '{}' ({} members)", peer_id, room_id, room.len());

        self.events.emit(RelayEvent::Joined {
            peer: peer_id,
            room: room_id.clone(),
        });
        self.deliver(
            &peer_id,
            ServerMessage::Joined {
                peer_id,
                room: room_id.clone(),
                peers: existing.clone(),
            },
        );
        for member in &existing {
            self.deliver(member, ServerMessage::PeerJoined { peer_id });
        }
        Ok(existing)
    }

    /// Removes the peer from its room, dropping the room once empty, and tells
    /// the remaining members. Returns the room left, `None` if there was none.
    pub fn leave(&mut self, peer_id: PeerId) -> Option<RoomId> {
        let room_id = self.peers.get_mut(&peer_id)?.room.take()?;

        let remaining = match self.rooms.get_mut(&room_id) {
            Some(room) => {
                room.remove(&peer_id);
                room.others(&peer_id)
            }
            None => Vec::new(),
        };
        if remaining.is_empty()
            && let Some(room) = self.rooms.remove(&room_id)
        {
            info!("Room '{}' is empty, removing it", room.id());
        }

        self.events.emit(RelayEvent::Left {
            peer: peer_id,
            room: room_id.clone(),
        });
        for member in &remaining {
            self.deliver(member, ServerMessage::PeerLeft { peer_id });
        }
        Some(room_id)
    }

    /// Leaves any room, then drops the peer and with it the registry's handle
    /// to its outbound queue.
    pub fn unregister(&mut self, peer_id: PeerId) -> RelayResult<()> {
        if !self.peers.contains_key(&peer_id) {
            return Err(RelayError::UnknownPeer(peer_id));
        }
        self.leave(peer_id);
        self.peers.remove(&peer_id);
        debug!("Unregistered peer {} ({} live)", peer_id, self.peers.len());
        Ok(())
    }

    /// Members of `room_id`; empty for a room that does not exist.
    pub fn members_of(&self, room_id: &RoomId) -> HashSet<PeerId> {
        self.rooms
            .get(room_id)
            .map(|room| room.members().clone())
            .unwrap_or_default()
    }

    pub fn peer_of(&self, peer_id: &PeerId) -> RelayResult<PeerInfo> {
        self.peers
            .get(peer_id)
            .map(Peer::info)
            .ok_or(RelayError::UnknownPeer(*peer_id))
    }

    /// Fans a signal out to the sender's room and enqueues it for every
    /// recipient in this same step, so a peer that has already left or
    /// unregistered can never be handed the message.
    ///
    /// A target that does not parse as a peer id cannot be a member, so it
    /// fails like any other target outside the room.
    pub fn route(&self, message: SignalingMessage) -> RelayResult<RouteReport> {
        let room = self.room_of(message.sender)?;
        let target = match message.target.as_deref() {
            Some(raw) => Some(
                raw.parse::<PeerId>()
                    .map_err(|_| RelayError::UnknownTarget(raw.to_owned()))?,
            ),
            None => None,
        };
        let recipients = match target {
            Some(target) if room.contains(&target) => vec![target],
            Some(target) => return Err(RelayError::UnknownTarget(target.to_string())),
            None => room.others(&message.sender),
        };
        let frame = message.into_relayed(target);

        let mut report = RouteReport::default();
        for recipient in &recipients {
            match self.deliver(recipient, frame.clone()) {
                Delivery::Queued => report.delivered += 1,
                Delivery::Overflow | Delivery::Closed => report.dropped += 1,
            }
        }
        Ok(report)
    }

    fn room_of(&self, peer_id: PeerId) -> RelayResult<&Room> {
        self.peers
            .get(&peer_id)
            .ok_or(RelayError::UnknownPeer(peer_id))?
            .room
            .as_ref()
            .and_then(|id| self.rooms.get(id))
            .ok_or(RelayError::NotInRoom)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            peers: self.peers.len(),
            rooms: self.rooms.len(),
        }
    }

    fn deliver(&self, peer_id: &PeerId, message: ServerMessage) -> Delivery {
        let Some(peer) = self.peers.get(peer_id) else {
            return Delivery::Closed;
        };
        let delivery = peer.connection.enqueue(message);
        match delivery {
            Delivery::Overflow => {
                self.events.emit(RelayEvent::QueueOverflow { peer: *peer_id });
            }
            Delivery::Closed => debug!("Queue of {} closed before delivery", peer_id),
            Delivery::Queued => {}
        }
        delivery
    }
}
