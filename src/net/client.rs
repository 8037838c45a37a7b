//! Relay client
//!
//! A non-blocking UDP association with the relay. Peers are held behind a
//! mutex and replaced wholesale on every state message, last writer wins.
//! Send and receive failures are dropped; the next tick simply tries again.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use hashbrown::HashMap;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use super::protocol::{decode, encode, ClientMessage, PeerState, Pose, ServerMessage, MAX_DATAGRAM};

/// Seconds between pose updates (20 Hz)
pub const SEND_INTERVAL: f32 = 0.05;

pub type PeerMap = HashMap<String, PeerState>;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not resolve {0}")]
    Resolve(String),
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] super::protocol::EncodeError),
}

#[derive(Debug, Default)]
pub struct NetworkClient {
    socket: Option<UdpSocket>,
    server_addr: Option<SocketAddr>,
    my_id: Option<String>,
    peers: Mutex<PeerMap>,
    send_timer: f32,
}

impl NetworkClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a socket and send a join. Success means the datagram left the
    /// socket; the relay's `joined` reply arrives later through `receive`.
    pub fn connect(&mut self, host: &str, port: u16, name: &str, color_index: u32) -> Result<(), ConnectError> {
        self.disconnect();

        let server_addr = (host, port)
            .to_socket_addrs()
            .map_err(|_| ConnectError::Resolve(format!("{}:{}", host, port)))?
            .next()
            .ok_or_else(|| ConnectError::Resolve(format!("{}:{}", host, port)))?;
        let local: SocketAddr = if server_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        socket.send_to(&encode(&ClientMessage::join(name, color_index))?, server_addr)?;

        info!("Connecting to relay at {}", server_addr);
        self.socket = Some(socket);
        self.server_addr = Some(server_addr);
        self.send_timer = 0.0;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Identity assigned by the relay, once `joined` has arrived
    pub fn my_id(&self) -> Option<&str> {
        self.my_id.as_deref()
    }

    /// Best-effort pose update; a no-op while disconnected
    pub fn send_update(&self, pose: Pose) {
        let (Some(socket), Some(addr)) = (&self.socket, self.server_addr) else {
            return;
        };
        match encode(&ClientMessage::update(pose)) {
            Ok(bytes) => {
                if let Err(e) = socket.send_to(&bytes, addr) {
                    debug!("Update send failed: {}", e);
                }
            }
            Err(e) => debug!("Failed to encode update: {}", e),
        }
    }

    /// Drain every pending datagram. Returns how many messages were applied.
    pub fn receive(&mut self) -> usize {
        let Some(socket) = &self.socket else {
            return 0;
        };
        let mut buf = [0u8; MAX_DATAGRAM];
        let mut applied = 0;

        loop {
            let len = match socket.recv_from(&mut buf) {
                Ok((len, _)) => len,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    debug!("Receive failed: {}", e);
                    break;
                }
            };
            match decode::<ServerMessage>(&buf[..len]) {
                Ok(ServerMessage::Joined { id }) => {
                    info!("Joined relay as {}", id);
                    self.my_id = Some(id);
                    applied += 1;
                }
                Ok(ServerMessage::State { players }) => {
                    let me = self.my_id.as_deref();
                    let snapshot: PeerMap = players
                        .into_iter()
                        .filter(|p| Some(p.id.as_str()) != me)
                        .map(|p| (p.id.clone(), p))
                        .collect();
                    *self.peers.lock() = snapshot;
                    applied += 1;
                }
                Err(e) => debug!("Dropping malformed datagram: {}", e),
            }
        }
        applied
    }

    /// Copy of the current peer snapshot
    pub fn other_players(&self) -> PeerMap {
        self.peers.lock().clone()
    }

    /// Drain inbound datagrams and send a pose update every `SEND_INTERVAL`
    pub fn pump(&mut self, dt: f32, pose: Pose) {
        if !self.is_connected() {
            return;
        }
        self.receive();
        self.send_timer += dt;
        if self.send_timer >= SEND_INTERVAL {
            self.send_timer = 0.0;
            self.send_update(pose);
        }
    }

    /// Send a best-effort leave and drop all local network state
    pub fn disconnect(&mut self) {
        if let (Some(socket), Some(addr)) = (self.socket.take(), self.server_addr.take()) {
            if let Ok(bytes) = encode(&ClientMessage::Leave) {
                if let Err(e) = socket.send_to(&bytes, addr) {
                    debug!("Leave send failed: {}", e);
                }
            }
            info!("Disconnected from relay");
        }
        self.my_id = None;
        self.send_timer = 0.0;
        self.peers.lock().clear();
    }
}

impl Drop for NetworkClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fake_relay() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        socket
    }

    fn recv_client(relay: &UdpSocket) -> (ClientMessage, SocketAddr) {
        let mut buf = [0u8; MAX_DATAGRAM];
        let (len, from) = relay.recv_from(&mut buf).unwrap();
        (decode(&buf[..len]).unwrap(), from)
    }

    fn reply(relay: &UdpSocket, to: SocketAddr, message: &ServerMessage) {
        relay.send_to(&encode(message).unwrap(), to).unwrap();
    }

    fn drain_until(client: &mut NetworkClient, count: usize) {
        let mut applied = 0;
        for _ in 0..200 {
            applied += client.receive();
            if applied >= count {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn peer(id: &str, name: &str) -> PeerState {
        PeerState {
            id: id.to_string(),
            name: name.to_string(),
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            color_index: 0,
        }
    }

    #[test]
    fn test_disconnected_is_noop() {
        let mut client = NetworkClient::new();
        client.send_update(Pose::default());
        assert_eq!(client.receive(), 0);
        assert!(client.other_players().is_empty());
    }

    #[test]
    fn test_join_then_state_excludes_self() {
        let relay = fake_relay();
        let port = relay.local_addr().unwrap().port();
        let mut client = NetworkClient::new();
        client.connect("127.0.0.1", port, "Me", 2).unwrap();

        let (join, from) = recv_client(&relay);
        assert_eq!(join, ClientMessage::join("Me", 2));

        reply(&relay, from, &ServerMessage::Joined { id: "me".to_string() });
        drain_until(&mut client, 1);
        assert_eq!(client.my_id(), Some("me"));

        reply(
            &relay,
            from,
            &ServerMessage::State {
                players: vec![peer("me", "Me"), peer("other", "Them")],
            },
        );
        drain_until(&mut client, 1);
        let others = client.other_players();
        assert_eq!(others.len(), 1);
        assert_eq!(others["other"].name, "Them");
    }

    #[test]
    fn test_state_replaces_not_merges() {
        let relay = fake_relay();
        let port = relay.local_addr().unwrap().port();
        let mut client = NetworkClient::new();
        client.connect("127.0.0.1", port, "Me", 0).unwrap();
        let (_, from) = recv_client(&relay);

        reply(&relay, from, &ServerMessage::State { players: vec![peer("a", "A")] });
        drain_until(&mut client, 1);
        reply(&relay, from, &ServerMessage::State { players: vec![peer("b", "B")] });
        drain_until(&mut client, 1);

        let others = client.other_players();
        assert_eq!(others.len(), 1);
        assert!(others.contains_key("b"));
    }

    #[test]
    fn test_pump_rate_limits_updates() {
        let relay = fake_relay();
        relay.set_read_timeout(Some(Duration::from_millis(200))).unwrap();
        let port = relay.local_addr().unwrap().port();
        let mut client = NetworkClient::new();
        client.connect("127.0.0.1", port, "Me", 0).unwrap();
        let _ = recv_client(&relay);

        // four 60 Hz frames cross the 50 ms send interval exactly once
        for _ in 0..4 {
            client.pump(1.0 / 60.0, Pose::default());
        }
        let (first, _) = recv_client(&relay);
        assert!(matches!(first, ClientMessage::Update { .. }));
        let mut buf = [0u8; MAX_DATAGRAM];
        assert!(relay.recv_from(&mut buf).is_err());
    }

    #[test]
    fn test_disconnect_sends_leave_and_clears() {
        let relay = fake_relay();
        let port = relay.local_addr().unwrap().port();
        let mut client = NetworkClient::new();
        client.connect("127.0.0.1", port, "Me", 0).unwrap();
        let (_, from) = recv_client(&relay);
        reply(&relay, from, &ServerMessage::State { players: vec![peer("a", "A")] });
        drain_until(&mut client, 1);

        client.disconnect();
        let (leave, _) = recv_client(&relay);
        assert_eq!(leave, ClientMessage::Leave);
        assert!(!client.is_connected());
        assert!(client.other_players().is_empty());
        assert!(client.my_id().is_none());
    }
}
