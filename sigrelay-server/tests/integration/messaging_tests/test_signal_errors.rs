use serde_json::json;
use sigrelay_core::{ErrorCode, PeerId, ServerMessage};
use sigrelay_server::RelayEvent;

use crate::integration::{connect, create_test_relay, init_tracing, join_clients};

#[tokio::test]
async fn test_signal_before_join_is_rejected() {
    init_tracing();

    let relay = create_test_relay().await;
    let mut clients = join_clients(&relay, "r1", 1).await;
    let mut outsider = connect(&relay).await;

    outsider
        .send_signal("offer", None, json!({"sdp": "x"}))
        .await;
    assert_eq!(outsider.recv_error_code().await, Some(ErrorCode::NotInRoom));
    assert!(clients[0].expect_no_signal(200).await);

    // the connection survives the error
    outsider.join("r1").await;

    outsider.close().await;
    for client in clients {
        client.close().await;
    }
}

#[tokio::test]
async fn test_target_outside_room_is_rejected() {
    init_tracing();

    let relay = create_test_relay().await;
    let mut room_a = join_clients(&relay, "a", 1).await;
    let mut room_b = join_clients(&relay, "b", 1).await;
    let other_room_peer = room_b[0].peer_id();

    room_a[0]
        .send_signal("answer", Some(other_room_peer), json!({"sdp": "x"}))
        .await;
    assert_eq!(room_a[0].recv_error_code().await, Some(ErrorCode::UnknownTarget));
    assert!(room_b[0].expect_no_signal(200).await);

    room_a[0]
        .send_signal("answer", Some(PeerId::new()), json!({"sdp": "x"}))
        .await;
    assert_eq!(room_a[0].recv_error_code().await, Some(ErrorCode::UnknownTarget));

    for client in room_a.into_iter().chain(room_b) {
        client.close().await;
    }
}

#[tokio::test]
async fn test_non_peer_target_is_unknown_not_malformed() {
    init_tracing();

    let relay = create_test_relay().await;
    let mut clients = join_clients(&relay, "r1", 2).await;
    let sender = clients[0].peer_id();

    // more than the violation limit; none of them may count against it
    for _ in 0..4 {
        clients[0]
            .send_json(json!({"type": "answer", "target": "P2", "payload": {"sdp": "x"}}))
            .await;
        assert_eq!(clients[0].recv_error_code().await, Some(ErrorCode::UnknownTarget));
    }
    assert!(clients[1].expect_no_signal(200).await);
    assert!(!relay.events.contains(|e| matches!(e, RelayEvent::ProtocolViolation { .. })));

    clients[0]
        .send_signal("offer", None, json!({"sdp": "still-open"}))
        .await;
    match clients[1].recv_signal().await {
        Some(ServerMessage::Offer(relayed)) => assert_eq!(relayed.sender, sender),
        other => panic!("Expected offer, got {:?}", other),
    }

    for client in clients {
        client.close().await;
    }
}
