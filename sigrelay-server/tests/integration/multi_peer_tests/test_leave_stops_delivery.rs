use serde_json::json;
use sigrelay_core::{RoomId, ServerMessage};
use sigrelay_server::RelayEvent;

use crate::integration::{create_test_relay, init_tracing, join_clients};

#[tokio::test]
async fn test_peer_leaves_others_stay() {
    init_tracing();

    let relay = create_test_relay().await;
    let mut clients = join_clients(&relay, "r1", 3).await;
    let leaver_id = clients[2].peer_id();

    clients[2].send_json(json!({"type": "leave"})).await;
    assert_eq!(
        clients[2].recv().await,
        Some(ServerMessage::Left {
            room: RoomId::from("r1")
        })
    );
    assert!(clients[0].wait_peer_left(leaver_id).await);
    assert!(relay.events.contains(|e| *e
        == RelayEvent::Left {
            peer: leaver_id,
            room: RoomId::from("r1")
        }));

    clients[0]
        .send_signal("offer", None, json!({"sdp": "after-leave"}))
        .await;

    assert!(matches!(
        clients[1].recv_signal().await,
        Some(ServerMessage::Offer(_))
    ));
    assert!(
        clients[2].expect_no_signal(300).await,
        "A peer that left must not receive room traffic"
    );

    // leaving twice is harmless and the connection stays usable
    clients[2].send_json(json!({"type": "leave"})).await;
    clients[2].join("r2").await;

    for client in clients {
        client.close().await;
    }
}
