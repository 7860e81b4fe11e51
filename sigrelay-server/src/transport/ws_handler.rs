use crate::error::{RelayError, RelayResult};
use crate::events::{DisconnectReason, RelayEvent};
use crate::registry::{Delivery, PeerConnection};
use crate::transport::{AppState, ConnectionState};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitStream;
use futures::{Sink, SinkExt, StreamExt};
use sigrelay_core::{ClientMessage, ErrorCode, PeerId, ServerMessage};
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut lifecycle = ConnectionState::Connecting;
    let (mut sink, stream) = socket.split();
    let (connection, outbound_rx) = PeerConnection::channel(state.config.max_queue_depth);
    let outbox = connection.downgrade();

    let peer_id = match state.registry.register(connection).await {
        Ok(id) => id,
        Err(e) => {
            warn!("Rejecting connection: {}", e);
            if let Some(frame) = error_frame(&e).and_then(|msg| encode(&msg)) {
                let _ = sink.send(frame).await;
            }
            let _ = sink.send(Message::Close(None)).await;
            lifecycle.advance(ConnectionState::Closed);
            return;
        }
    };

    lifecycle.advance(ConnectionState::Open);
    info!("New WebSocket connection: {}", peer_id);
    state.events.emit(RelayEvent::Connected { peer: peer_id });

    let mut send_task = tokio::spawn(drain_outbound(sink, outbound_rx, peer_id));
    let mut recv_task = tokio::spawn(PeerSession::new(peer_id, outbox, state.clone()).run(stream));

    let reason = tokio::select! {
        written = &mut send_task => {
            recv_task.abort();
            written.map_or(DisconnectReason::WriteError, DrainOutcome::reason)
        }
        read = &mut recv_task => read.unwrap_or(DisconnectReason::ReadError),
    };

    lifecycle.advance(ConnectionState::Closing);
    if let Err(e) = state.registry.unregister(peer_id).await {
        debug!("Unregister of {} failed: {}", peer_id, e);
    }

    // The registry held the last strong queue handle, so the drain task now
    // flushes what is left and exits.
    finish_drain(&mut send_task, state.config.close_grace(), peer_id).await;

    lifecycle.advance(ConnectionState::Closed);
    info!("WebSocket disconnected: {} ({})", peer_id, reason.as_str());
    state.events.emit(RelayEvent::Disconnected {
        peer: peer_id,
        reason,
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainOutcome {
    /// Every queued frame was written and the queue closed.
    Flushed,
    WriteFailed,
}

impl DrainOutcome {
    /// Why the connection ends when the drain finishes before the read side.
    fn reason(self) -> DisconnectReason {
        match self {
            // The registry drops its queue handle only on unregister, which
            // this connection has not asked for yet. The queue closing first
            // therefore means the registry task itself went away.
            DrainOutcome::Flushed => DisconnectReason::Shutdown,
            DrainOutcome::WriteFailed => DisconnectReason::WriteError,
        }
    }
}

async fn drain_outbound<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<ServerMessage>,
    peer_id: PeerId,
) -> DrainOutcome
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(msg) = outbound.recv().await {
        let Some(frame) = encode(&msg) else {
            continue;
        };
        if let Err(e) = sink.send(frame).await {
            debug!("Write to {} failed: {}", peer_id, e);
            return DrainOutcome::WriteFailed;
        }
    }

    let _ = sink.send(Message::Close(None)).await;
    DrainOutcome::Flushed
}

/// Gives the drain task `grace` to flush; aborts it after that. Returns
/// whether it finished in time.
async fn finish_drain(
    send_task: &mut JoinHandle<DrainOutcome>,
    grace: Duration,
    peer_id: PeerId,
) -> bool {
    if send_task.is_finished() || tokio::time::timeout(grace, &mut *send_task).await.is_ok() {
        return true;
    }
    debug!("Outbound drain for {} exceeded grace period", peer_id);
    send_task.abort();
    false
}

fn encode(msg: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            None
        }
    }
}

fn error_frame(err: &RelayError) -> Option<ServerMessage> {
    err.code()
        .map(|code| ServerMessage::error(code, err.to_string()))
}

/// Read side of one connection.
struct PeerSession {
    peer_id: PeerId,
    outbox: mpsc::WeakSender<ServerMessage>,
    state: AppState,
    violations: u32,
}

impl PeerSession {
    fn new(peer_id: PeerId, outbox: mpsc::WeakSender<ServerMessage>, state: AppState) -> Self {
        Self {
            peer_id,
            outbox,
            state,
            violations: 0,
        }
    }

    async fn run(mut self, mut stream: SplitStream<WebSocket>) -> DisconnectReason {
        let idle = self.state.config.idle_timeout();

        loop {
            let frame = match tokio::time::timeout(idle, stream.next()).await {
                Err(_) => {
                    info!("Peer {} idle for {:?}, closing", self.peer_id, idle);
                    return DisconnectReason::IdleTimeout;
                }
                Ok(None) => return DisconnectReason::ClientClosed,
                Ok(Some(Err(e))) => {
                    debug!("Read from {} failed: {}", self.peer_id, e);
                    return DisconnectReason::ReadError;
                }
                Ok(Some(Ok(frame))) => frame,
            };

            let outcome = match frame {
                Message::Text(text) => self.handle_text(text.as_str()).await,
                Message::Binary(_) => self.protocol_violation("binary frames are not supported"),
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(_) => return DisconnectReason::ClientClosed,
            };
            if let Err(reason) = outcome {
                return reason;
            }
        }
    }

    async fn handle_text(&mut self, text: &str) -> Result<(), DisconnectReason> {
        let message = match ClientMessage::from_json(text) {
            Ok(message) => message,
            Err(e) => return self.protocol_violation(&e.to_string()),
        };
        self.violations = 0;

        match self.dispatch(message).await {
            Ok(()) => Ok(()),
            Err(RelayError::RegistryClosed) => {
                error!("Registry stopped while serving {}", self.peer_id);
                Err(DisconnectReason::Shutdown)
            }
            Err(e) => {
                debug!("Rejected frame from {}: {}", self.peer_id, e);
                if let Some(frame) = error_frame(&e) {
                    self.reply(frame);
                }
                Ok(())
            }
        }
    }

    async fn dispatch(&self, message: ClientMessage) -> RelayResult<()> {
        match message {
            ClientMessage::Join { room } => {
                self.state.registry.join(self.peer_id, room).await?;
            }
            ClientMessage::Leave => {
                if let Some(room) = self.state.registry.leave(self.peer_id).await? {
                    self.reply(ServerMessage::Left { room });
                }
            }
            signal => {
                if let Some(msg) = signal.into_signaling(self.peer_id) {
                    self.state.router.route(self.peer_id, msg).await?;
                }
            }
        }
        Ok(())
    }

    /// Drops the offending frame; enough of them in a row ends the connection.
    fn protocol_violation(&mut self, detail: &str) -> Result<(), DisconnectReason> {
        self.violations += 1;
        self.state.events.emit(RelayEvent::ProtocolViolation {
            peer: self.peer_id,
            consecutive: self.violations,
        });
        self.reply(ServerMessage::error(ErrorCode::ProtocolError, detail));

        if self.violations >= self.state.config.max_protocol_violations {
            warn!(
                "Disconnecting {} after {} malformed frames",
                self.peer_id, self.violations
            );
            return Err(DisconnectReason::ProtocolViolations);
        }
        Ok(())
    }

    fn reply(&self, message: ServerMessage) {
        let Some(outbound) = self.outbox.upgrade() else {
            return;
        };
        if PeerConnection::new(outbound).enqueue(message) == Delivery::Overflow {
            self.state
                .events
                .emit(RelayEvent::QueueOverflow { peer: self.peer_id });
        }
    }
}
