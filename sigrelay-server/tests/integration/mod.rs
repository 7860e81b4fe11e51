
use tracing::Level;

use crate::utils::{TestClient, TestRelay, spawn_relay, test_config};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn create_test_relay() -> TestRelay {
    spawn_relay(test_config()).await
}

pub async fn connect(relay: &TestRelay) -> TestClient {
    TestClient::connect(&relay.ws_url())
        .await
        .expect("Failed to connect test client")
}

/// Connects `count` clients and joins them to `room` in order.
pub async fn join_clients(relay: &TestRelay, room: &str, count: usize) -> Vec<TestClient> {
    let mut clients = Vec::with_capacity(count);
    for _ in 0..count {
        let mut client = connect(relay).await;
        client.join(room).await;
        clients.push(client);
    }
    clients
}
