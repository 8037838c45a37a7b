//! Relay peer registry
//!
//! Peers are keyed by source address. Join registers (or re-registers),
//! update refreshes pose and last-seen, leave and timeout remove.
//! Updates from unregistered addresses are ignored.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tracing::info;

use super::protocol::{ClientMessage, PeerState, ServerMessage};

#[derive(Debug, Clone)]
pub struct Peer {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub color_index: u32,
    pub last_seen: Instant,
}

/// Identity string sent to clients
pub fn peer_id(addr: &SocketAddr) -> String {
    format!("{}:{}", addr.ip(), addr.port())
}

#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<SocketAddr, Peer>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn get(&self, addr: &SocketAddr) -> Option<&Peer> {
        self.peers.get(addr)
    }

    pub fn addrs(&self) -> impl Iterator<Item = &SocketAddr> {
        self.peers.keys()
    }

    /// Apply one client message. Returns the reply owed to the sender, if any.
    pub fn handle(&mut self, addr: SocketAddr, message: ClientMessage, now: Instant) -> Option<ServerMessage> {
        match message {
            ClientMessage::Join {
                name,
                x,
                y,
                rotation,
                color_index,
            } => {
                info!("Player {} joined from {}", name, addr);
                self.peers.insert(
                    addr,
                    Peer {
                        name,
                        x,
                        y,
                        rotation,
                        color_index,
                        last_seen: now,
                    },
                );
                Some(ServerMessage::Joined { id: peer_id(&addr) })
            }
            ClientMessage::Update {
                x,
                y,
                rotation,
                color_index,
            } => {
                if let Some(peer) = self.peers.get_mut(&addr) {
                    peer.x = x.unwrap_or(peer.x);
                    peer.y = y.unwrap_or(peer.y);
                    peer.rotation = rotation.unwrap_or(peer.rotation);
                    peer.color_index = color_index.unwrap_or(peer.color_index);
                    peer.last_seen = now;
                }
                None
            }
            ClientMessage::Leave => {
                if let Some(peer) = self.peers.remove(&addr) {
                    info!("Player {} left", peer.name);
                }
                None
            }
        }
    }

    /// Full-state message listing every peer
    pub fn state_message(&self) -> ServerMessage {
        let players = self
            .peers
            .iter()
            .map(|(addr, peer)| PeerState {
                id: peer_id(addr),
                name: peer.name.clone(),
                x: peer.x,
                y: peer.y,
                rotation: peer.rotation,
                color_index: peer.color_index,
            })
            .collect();
        ServerMessage::State { players }
    }

    /// Remove peers silent for longer than `timeout`; returns how many were evicted
    pub fn evict_stale(&mut self, now: Instant, timeout: Duration) -> usize {
        let before = self.peers.len();
        self.peers.retain(|_, peer| {
            let stale = now.saturating_duration_since(peer.last_seen) > timeout;
            if stale {
                info!("Player {} timed out", peer.name);
            }
            !stale
        });
        before - self.peers.len()
    }
}
