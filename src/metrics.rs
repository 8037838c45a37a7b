//! Relay metrics
//!
//! Counters for the relay loop, exposed in Prometheus text format.
//! Endpoint: http://0.0.0.0:<METRICS_PORT>/metrics

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

const BROADCAST_HISTORY: usize = 256;

#[derive(Debug)]
pub struct RelayMetrics {
    pub peers: AtomicU64,

    pub datagrams_in: AtomicU64,
    pub datagrams_out: AtomicU64,
    pub bytes_in: AtomicU64,
    pub bytes_out: AtomicU64,
    pub malformed: AtomicU64,
    pub send_errors: AtomicU64,

    pub joins: AtomicU64,
    pub leaves: AtomicU64,
    pub evictions: AtomicU64,
    pub broadcasts: AtomicU64,

    // Broadcast fan-out time (microseconds)
    pub broadcast_time_us: AtomicU64,
    pub broadcast_time_max_us: AtomicU64,

    start_time: Instant,
    broadcast_history: RwLock<VecDeque<u64>>,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self {
            peers: AtomicU64::new(0),
            datagrams_in: AtomicU64::new(0),
            datagrams_out: AtomicU64::new(0),
            bytes_in: AtomicU64::new(0),
            bytes_out: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            send_errors: AtomicU64::new(0),
            joins: AtomicU64::new(0),
            leaves: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            broadcast_time_us: AtomicU64::new(0),
            broadcast_time_max_us: AtomicU64::new(0),
            start_time: Instant::now(),
            broadcast_history: RwLock::new(VecDeque::with_capacity(BROADCAST_HISTORY)),
        }
    }

    pub fn record_received(&self, bytes: usize) {
        self.datagrams_in.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_sent(&self, bytes: usize) {
        self.datagrams_out.fetch_add(1, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record one broadcast round and keep the worst recent fan-out time
    pub fn record_broadcast(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.broadcast_time_us.store(us, Ordering::Relaxed);

        let mut history = self.broadcast_history.write();
        history.push_back(us);
        while history.len() > BROADCAST_HISTORY {
            history.pop_front();
        }
        let max = history.iter().copied().max().unwrap_or(0);
        self.broadcast_time_max_us.store(max, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("asteroid_relay_peers", "Registered peers", "gauge",
            self.peers.load(Ordering::Relaxed));

        metric!("asteroid_relay_datagrams_received_total", "Datagrams received", "counter",
            self.datagrams_in.load(Ordering::Relaxed));
        metric!("asteroid_relay_datagrams_sent_total", "Datagrams sent", "counter",
            self.datagrams_out.load(Ordering::Relaxed));
        metric!("asteroid_relay_bytes_received_total", "Bytes received", "counter",
            self.bytes_in.load(Ordering::Relaxed));
        metric!("asteroid_relay_bytes_sent_total", "Bytes sent", "counter",
            self.bytes_out.load(Ordering::Relaxed));
        metric!("asteroid_relay_malformed_total", "Datagrams that failed to decode", "counter",
            self.malformed.load(Ordering::Relaxed));
        metric!("asteroid_relay_send_errors_total", "Failed sends", "counter",
            self.send_errors.load(Ordering::Relaxed));

        metric!("asteroid_relay_joins_total", "Join messages handled", "counter",
            self.joins.load(Ordering::Relaxed));
        metric!("asteroid_relay_leaves_total", "Leave messages handled", "counter",
            self.leaves.load(Ordering::Relaxed));
        metric!("asteroid_relay_evictions_total", "Peers removed for inactivity", "counter",
            self.evictions.load(Ordering::Relaxed));
        metric!("asteroid_relay_broadcasts_total", "State broadcast rounds", "counter",
            self.broadcasts.load(Ordering::Relaxed));

        metric!("asteroid_relay_broadcast_time_microseconds", "Last broadcast fan-out time", "gauge",
            self.broadcast_time_us.load(Ordering::Relaxed));
        metric!("asteroid_relay_broadcast_time_max_microseconds", "Worst recent broadcast fan-out time", "gauge",
            self.broadcast_time_max_us.load(Ordering::Relaxed));
        metric!("asteroid_relay_uptime_seconds", "Relay uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// JSON view of the same counters
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "peers": self.peers.load(Ordering::Relaxed),
            "network": {
                "datagrams_in": self.datagrams_in.load(Ordering::Relaxed),
                "datagrams_out": self.datagrams_out.load(Ordering::Relaxed),
                "bytes_in": self.bytes_in.load(Ordering::Relaxed),
                "bytes_out": self.bytes_out.load(Ordering::Relaxed),
                "malformed": self.malformed.load(Ordering::Relaxed),
                "send_errors": self.send_errors.load(Ordering::Relaxed),
            },
            "registry": {
                "joins": self.joins.load(Ordering::Relaxed),
                "leaves": self.leaves.load(Ordering::Relaxed),
                "evictions": self.evictions.load(Ordering::Relaxed),
            },
            "broadcast": {
                "count": self.broadcasts.load(Ordering::Relaxed),
                "time_us": self.broadcast_time_us.load(Ordering::Relaxed),
                "time_max_us": self.broadcast_time_max_us.load(Ordering::Relaxed),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
        .to_string()
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve `/metrics`, `/metrics/json` and `/health` over plain HTTP
pub async fn start_metrics_server(metrics: Arc<RelayMetrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);
                    let response = route(&request, &metrics);
                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}

fn route(request: &str, metrics: &RelayMetrics) -> String {
    let (content_type, body) = if request.starts_with("GET /metrics/json") {
        ("application/json", metrics.to_json())
    } else if request.starts_with("GET /metrics") {
        ("text/plain; version=0.0.4", metrics.to_prometheus())
    } else if request.starts_with("GET /health") {
        ("text/plain", "OK".to_string())
    } else {
        return "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string();
    };
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        content_type,
        body.len(),
        body
    )
}
