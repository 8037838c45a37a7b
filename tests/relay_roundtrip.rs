use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use asteroid_miner::config::RelayConfig;
use asteroid_miner::metrics::RelayMetrics;
use asteroid_miner::net::protocol::{decode, encode, ClientMessage, ServerMessage, MAX_DATAGRAM};
use asteroid_miner::net::{NetworkClient, Pose, Relay};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout};

fn test_config() -> RelayConfig {
    RelayConfig {
        bind_address: "127.0.0.1".parse().unwrap(),
        port: 0,
        broadcast_interval_ms: 20,
        cleanup_interval_ms: 50,
        peer_timeout_ms: 200,
        metrics_port: None,
    }
}

async fn start_relay(config: RelayConfig) -> (SocketAddr, Arc<RelayMetrics>, oneshot::Sender<()>) {
    let metrics = Arc::new(RelayMetrics::new());
    let relay = Relay::bind(config, metrics.clone()).await.unwrap();
    let addr = relay.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(relay.run(async {
        let _ = stop_rx.await;
    }));
    (addr, metrics, stop_tx)
}

async fn recv_server(socket: &UdpSocket) -> ServerMessage {
    let mut buf = [0u8; MAX_DATAGRAM];
    let (len, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    decode(&buf[..len]).unwrap()
}

async fn join(socket: &UdpSocket, relay: SocketAddr, name: &str) -> String {
    socket
        .send_to(&encode(&ClientMessage::join(name, 1)).unwrap(), relay)
        .await
        .unwrap();
    loop {
        if let ServerMessage::Joined { id } = recv_server(socket).await {
            return id;
        }
    }
}

#[tokio::test]
async fn test_join_reply_and_broadcast() {
    let (relay, metrics, stop) = start_relay(test_config()).await;
    let a = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let b = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let id_a = join(&a, relay, "A").await;
    assert_eq!(id_a, a.local_addr().unwrap().to_string());
    join(&b, relay, "B").await;

    let players = loop {
        if let ServerMessage::State { players } = recv_server(&a).await {
            if players.len() == 2 {
                break players;
            }
        }
    };
    assert!(players.iter().any(|p| p.name == "A"));
    assert!(players.iter().any(|p| p.name == "B"));
    assert_eq!(metrics.peers.load(Ordering::Relaxed), 2);
    let _ = stop.send(());
}

#[tokio::test]
async fn test_malformed_datagram_counted_and_skipped() {
    let (relay, metrics, stop) = start_relay(test_config()).await;
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(b"{not json", relay).await.unwrap();
    join(&socket, relay, "After").await;
    assert_eq!(metrics.malformed.load(Ordering::Relaxed), 1);
    let _ = stop.send(());
}

#[tokio::test]
async fn test_silent_peer_evicted() {
    let (relay, metrics, stop) = start_relay(test_config()).await;
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    join(&socket, relay, "Ghost").await;

    sleep(Duration::from_millis(500)).await;
    assert_eq!(metrics.peers.load(Ordering::Relaxed), 0);
    assert!(metrics.evictions.load(Ordering::Relaxed) >= 1);
    let _ = stop.send(());
}

#[tokio::test]
async fn test_clients_see_each_other_but_not_themselves() {
    let (relay, _metrics, stop) = start_relay(test_config()).await;
    let port = relay.port();

    let mut one = NetworkClient::new();
    let mut two = NetworkClient::new();
    one.connect("127.0.0.1", port, "One", 1).unwrap();
    two.connect("127.0.0.1", port, "Two", 2).unwrap();

    let pose = Pose {
        x: 10.0,
        y: 20.0,
        rotation: 0.5,
        color_index: 2,
    };
    let mut seen = false;
    for _ in 0..100 {
        one.pump(0.05, Pose::default());
        two.pump(0.05, pose);
        let others = one.other_players();
        if one.my_id().is_some() && others.len() == 1 {
            let peer = others.values().next().unwrap();
            if peer.name == "Two" && peer.x == 10.0 {
                seen = true;
                break;
            }
        }
        sleep(Duration::from_millis(20)).await;
    }
    assert!(seen);
    assert!(!one.other_players().contains_key(one.my_id().unwrap()));

    two.disconnect();
    let _ = stop.send(());
}
