use crate::registry::{Registry, RegistryCommand};
use tokio::sync::mpsc;
use tracing::info;

/// Owns the [`Registry`] and applies commands in arrival order, so no two
/// mutations ever interleave and no lock is needed.
pub struct RegistryActor {
    registry: Registry,
    command_rx: mpsc::Receiver<RegistryCommand>,
}

impl RegistryActor {
    pub fn new(registry: Registry, command_rx: mpsc::Receiver<RegistryCommand>) -> Self {
        Self {
            registry,
            command_rx,
        }
    }

    pub async fn run(mut self) {
        info!("Registry event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!("Registry event loop finished");
    }

    // A dropped reply receiver means the requester went away; the state
    // change still stands.
    fn handle_command(&mut self, cmd: RegistryCommand) {
        match cmd {
            RegistryCommand::Register { connection, reply } => {
                let _ = reply.send(self.registry.register(connection));
            }
            RegistryCommand::Join {
                peer_id,
                room,
                reply,
            } => {
                let _ = reply.send(self.registry.join(peer_id, room));
            }
            RegistryCommand::Leave { peer_id, reply } => {
                let _ = reply.send(self.registry.leave(peer_id));
            }
            RegistryCommand::Unregister { peer_id, reply } => {
                let _ = reply.send(self.registry.unregister(peer_id));
            }
            RegistryCommand::MembersOf { room, reply } => {
                let _ = reply.send(self.registry.members_of(&room));
            }
            RegistryCommand::PeerOf { peer_id, reply } => {
                let _ = reply.send(self.registry.peer_of(&peer_id));
            }
            RegistryCommand::Route { message, reply } => {
                let _ = reply.send(self.registry.route(message));
            }
            RegistryCommand::Stats { reply } => {
                let _ = reply.send(self.registry.stats());
            }
        }
    }
}
