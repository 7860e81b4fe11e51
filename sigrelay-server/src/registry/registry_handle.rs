use crate::error::{RelayError, RelayResult};
use crate::events::EventSink;
use crate::registry::{
    PeerConnection, PeerInfo, Registry, RegistryActor, RegistryCommand, RegistryStats,
};
use crate::router::RouteReport;
use sigrelay_core::{PeerId, RoomId, SignalingMessage};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Cloneable front for the registry task.
///
/// The task stops once every handle is dropped.
#[derive(Clone, Debug)]
pub struct RegistryHandle {
    command_tx: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Spawns the registry task on the current runtime.
    pub fn spawn(max_connections: usize, capacity: usize, events: Arc<dyn EventSink>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let actor = RegistryActor::new(Registry::new(max_connections, events), command_rx);
        tokio::spawn(actor.run());

        Self { command_tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> RegistryCommand,
    ) -> RelayResult<T> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(make(reply))
            .await
            .map_err(|_| RelayError::RegistryClosed)?;
        response.await.map_err(|_| RelayError::RegistryClosed)
    }

    pub async fn register(&self, connection: PeerConnection) -> RelayResult<PeerId> {
        self.request(|reply| RegistryCommand::Register { connection, reply })
            .await?
    }

    pub async fn join(&self, peer_id: PeerId, room: RoomId) -> RelayResult<Vec<PeerId>> {
        self.request(|reply| RegistryCommand::Join {
            peer_id,
            room,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, peer_id: PeerId) -> RelayResult<Option<RoomId>> {
        self.request(|reply| RegistryCommand::Leave { peer_id, reply })
            .await
    }

    pub async fn unregister(&self, peer_id: PeerId) -> RelayResult<()> {
        self.request(|reply| RegistryCommand::Unregister { peer_id, reply })
            .await?
    }

    pub async fn members_of(&self, room: RoomId) -> RelayResult<HashSet<PeerId>> {
        self.request(|reply| RegistryCommand::MembersOf { room, reply })
            .await
    }

    pub async fn peer_of(&self, peer_id: PeerId) -> RelayResult<PeerInfo> {
        self.request(|reply| RegistryCommand::PeerOf { peer_id, reply })
            .await?
    }

    pub async fn route(&self, message: SignalingMessage) -> RelayResult<RouteReport> {
        self.request(|reply| RegistryCommand::Route { message, reply })
            .await?
    }

    pub async fn stats(&self) -> RelayResult<RegistryStats> {
        self.request(|reply| RegistryCommand::Stats { reply }).await
    }
}
