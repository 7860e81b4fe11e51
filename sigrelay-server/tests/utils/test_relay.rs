use crate::utils::RecordingEventSink;
use sigrelay_server::{AppState, RelayConfig, serve};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// A relay running on an ephemeral local port. Stops when dropped.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub events: RecordingEventSink,
    _shutdown: oneshot::Sender<()>,
}

impl TestRelay {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Plain HTTP GET, returns the raw response.
    pub async fn http_get(&self, path: &str) -> String {
        let mut stream = TcpStream::connect(self.addr)
            .await
            .expect("Failed to connect to relay");
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path, self.addr
        );
        stream
            .write_all(request.as_bytes())
            .await
            .expect("Failed to write request");

        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("Failed to read response");
        response
    }
}

pub fn test_config() -> RelayConfig {
    RelayConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..RelayConfig::default()
    }
}

pub async fn spawn_relay(config: RelayConfig) -> TestRelay {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    let events = RecordingEventSink::new();
    let state = AppState::new(config, Arc::new(events.clone()));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.await;
        };
        if let Err(e) = serve(listener, state, shutdown).await {
            tracing::error!("Test relay stopped: {:?}", e);
        }
    });

    TestRelay {
        addr,
        events,
        _shutdown: shutdown_tx,
    }
}
