//! Relay loop
//!
//! A single task multiplexes datagram receive, the periodic state broadcast
//! and the stale-peer sweep. The relay validates nothing beyond decoding;
//! clients may report any pose.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::protocol::{decode, encode, ClientMessage, ServerMessage, MAX_DATAGRAM};
use super::registry::PeerRegistry;
use crate::config::RelayConfig;
use crate::metrics::RelayMetrics;

pub struct Relay {
    socket: UdpSocket,
    registry: PeerRegistry,
    metrics: Arc<RelayMetrics>,
    config: RelayConfig,
}

impl Relay {
    pub async fn bind(config: RelayConfig, metrics: Arc<RelayMetrics>) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(config.socket_addr()).await?;
        info!("Relay listening on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            registry: PeerRegistry::new(),
            metrics,
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F: Future<Output = ()>>(mut self, shutdown: F) {
        let mut broadcast = interval(self.config.broadcast_interval());
        broadcast.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cleanup = interval(self.config.cleanup_interval());
        cleanup.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut buf = [0u8; MAX_DATAGRAM];
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, addr)) => self.on_datagram(&buf[..len], addr).await,
                    Err(e) => debug!("Receive error: {}", e),
                },
                _ = broadcast.tick() => self.broadcast_state().await,
                _ = cleanup.tick() => {
                    let evicted = self.registry.evict_stale(Instant::now(), self.config.peer_timeout());
                    if evicted > 0 {
                        self.metrics.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
                        self.update_peer_gauge();
                    }
                }
                _ = &mut shutdown => {
                    info!("Relay shutting down with {} peers", self.registry.len());
                    break;
                }
            }
        }
    }

    async fn on_datagram(&mut self, data: &[u8], addr: SocketAddr) {
        self.metrics.record_received(data.len());
        let message: ClientMessage = match decode(data) {
            Ok(message) => message,
            Err(e) => {
                self.metrics.malformed.fetch_add(1, Ordering::Relaxed);
                debug!("Malformed datagram from {}: {}", addr, e);
                return;
            }
        };

        match &message {
            ClientMessage::Join { .. } => {
                self.metrics.joins.fetch_add(1, Ordering::Relaxed);
            }
            ClientMessage::Leave => {
                self.metrics.leaves.fetch_add(1, Ordering::Relaxed);
            }
            ClientMessage::Update { .. } => {}
        }

        if let Some(reply) = self.registry.handle(addr, message, Instant::now()) {
            self.send(&reply, addr).await;
        }
        self.update_peer_gauge();
    }

    async fn broadcast_state(&mut self) {
        if self.registry.is_empty() {
            return;
        }
        let started = Instant::now();
        let bytes = match encode(&self.registry.state_message()) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Failed to encode state: {}", e);
                return;
            }
        };
        let targets: Vec<SocketAddr> = self.registry.addrs().copied().collect();
        for addr in targets {
            self.send_bytes(&bytes, addr).await;
        }
        self.metrics.record_broadcast(started.elapsed());
    }

    async fn send(&self, message: &ServerMessage, addr: SocketAddr) {
        match encode(message) {
            Ok(bytes) => self.send_bytes(&bytes, addr).await,
            Err(e) => debug!("Failed to encode reply: {}", e),
        }
    }

    async fn send_bytes(&self, bytes: &[u8], addr: SocketAddr) {
        match self.socket.send_to(bytes, addr).await {
            Ok(sent) => self.metrics.record_sent(sent),
            Err(e) => {
                self.metrics.send_errors.fetch_add(1, Ordering::Relaxed);
                debug!("Send to {} failed: {}", addr, e);
            }
        }
    }

    fn update_peer_gauge(&self) {
        self.metrics.peers.store(self.registry.len() as u64, Ordering::Relaxed);
    }
}
