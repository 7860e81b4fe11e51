use sigrelay_core::{PeerId, RoomId};
use std::collections::HashSet;

/// A named set of peers allowed to signal each other.
///
/// Holds ids only; the peers themselves belong to the registry.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: HashSet<PeerId>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: HashSet::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Returns `false` if the peer was already a member.
    pub fn insert(&mut self, peer_id: PeerId) -> bool {
        self.members.insert(peer_id)
    }

    pub fn remove(&mut self, peer_id: &PeerId) -> bool {
        self.members.remove(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.members.contains(peer_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &HashSet<PeerId> {
        &self.members
    }

    /// Every member except `peer_id`.
    pub fn others(&self, peer_id: &PeerId) -> Vec<PeerId> {
        self.members
            .iter()
            .filter(|id| *id != peer_id)
            .copied()
            .collect()
    }
}
