use sigrelay_core::ServerMessage;

use crate::integration::{connect, create_test_relay, init_tracing};

#[tokio::test]
async fn test_three_peers_join() {
    init_tracing();

    let relay = create_test_relay().await;

    let mut client1 = connect(&relay).await;
    let mut client2 = connect(&relay).await;
    let mut client3 = connect(&relay).await;

    assert!(client1.join("r1").await.is_empty());
    assert_eq!(client2.join("r1").await, vec![client1.peer_id()]);

    let mut existing = client3.join("r1").await;
    existing.sort();
    let mut expected = vec![client1.peer_id(), client2.peer_id()];
    expected.sort();
    assert_eq!(existing, expected, "Joined ack should list current members");

    assert_eq!(
        client1.recv().await,
        Some(ServerMessage::PeerJoined {
            peer_id: client2.peer_id()
        })
    );
    assert_eq!(
        client1.recv().await,
        Some(ServerMessage::PeerJoined {
            peer_id: client3.peer_id()
        })
    );
    assert_eq!(
        client2.recv().await,
        Some(ServerMessage::PeerJoined {
            peer_id: client3.peer_id()
        })
    );

    let health = relay.http_get("/health").await;
    assert!(health.contains(r#""peers":3"#), "{}", health);
    assert!(health.contains(r#""rooms":1"#), "{}", health);

    client1.close().await;
    client2.close().await;
    client3.close().await;
}
