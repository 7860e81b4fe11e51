use serde_json::json;
use sigrelay_core::{ErrorCode, ServerMessage};
use sigrelay_server::{DisconnectReason, RelayEvent};
use std::time::Duration;

use crate::integration::{connect, create_test_relay, init_tracing};

#[tokio::test]
async fn test_three_malformed_frames_force_disconnect() {
    init_tracing();

    let relay = create_test_relay().await;
    let mut client = connect(&relay).await;
    client.join("r1").await;
    let id = client.peer_id();

    client.send_raw("not json").await;
    client.send_json(json!({"type": "teleport"})).await;
    client.send_json(json!({"type": "offer"})).await;

    for _ in 0..3 {
        assert_eq!(client.recv_error_code().await, Some(ErrorCode::ProtocolError));
    }
    assert!(client.wait_closed(Duration::from_secs(2)).await);

    assert!(
        relay
            .events
            .wait_for(
                |e| *e
                    == RelayEvent::Disconnected {
                        peer: id,
                        reason: DisconnectReason::ProtocolViolations
                    },
                2000
            )
            .await
    );
}

#[tokio::test]
async fn test_valid_frame_resets_violation_count() {
    init_tracing();

    let relay = create_test_relay().await;
    let mut client = connect(&relay).await;

    client.send_raw("{").await;
    client.send_raw("{").await;
    client.send_json(json!({"type": "join", "room": "r1"})).await;
    client.send_raw("{").await;
    client.send_raw("{").await;

    let mut errors = 0;
    let mut joined = false;
    for _ in 0..5 {
        match client.recv().await {
            Some(ServerMessage::Error { code, .. }) => {
                assert_eq!(code, ErrorCode::ProtocolError);
                errors += 1;
            }
            Some(ServerMessage::Joined { .. }) => joined = true,
            other => panic!("Unexpected frame: {:?}", other),
        }
    }
    assert_eq!(errors, 4);
    assert!(joined);

    // still open: a second join is answered
    client.send_json(json!({"type": "join", "room": "r2"})).await;
    assert_eq!(client.recv_error_code().await, Some(ErrorCode::AlreadyInRoom));

    client.close().await;
}
