use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5555;

/// Relay server configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to bind the relay to
    pub bind_address: IpAddr,
    /// UDP port to listen on
    pub port: u16,
    /// Period of the full-state broadcast
    pub broadcast_interval_ms: u64,
    /// Period of the stale-peer sweep
    pub cleanup_interval_ms: u64,
    /// A peer silent for longer than this is evicted
    pub peer_timeout_ms: u64,
    /// Serve Prometheus metrics on this TCP port when set
    pub metrics_port: Option<u16>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            broadcast_interval_ms: 50,
            cleanup_interval_ms: 1000,
            peer_timeout_ms: 5000,
            metrics_port: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            None
        }
    }
}

fn env_millis(name: &str) -> Option<u64> {
    match env_parse::<u64>(name) {
        Some(0) => {
            tracing::warn!("{} must be > 0, using default", name);
            None
        }
        other => other,
    }
}

impl RelayConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(addr) = env_parse("BIND_ADDRESS") {
            config.bind_address = addr;
        }

        if let Some(port) = env_parse::<u16>("PORT") {
            if port > 0 {
                config.port = port;
            } else {
                tracing::warn!("PORT must be > 0, using default");
            }
        }

        if let Some(ms) = env_millis("BROADCAST_INTERVAL_MS") {
            config.broadcast_interval_ms = ms;
        }
        if let Some(ms) = env_millis("CLEANUP_INTERVAL_MS") {
            config.cleanup_interval_ms = ms;
        }
        if let Some(ms) = env_millis("PEER_TIMEOUT_MS") {
            config.peer_timeout_ms = ms;
        }

        config.metrics_port = env_parse("METRICS_PORT");

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.broadcast_interval_ms == 0 {
            return Err("broadcast_interval_ms must be at least 1".to_string());
        }
        if self.cleanup_interval_ms == 0 {
            return Err("cleanup_interval_ms must be at least 1".to_string());
        }
        if self.peer_timeout_ms == 0 {
            return Err("peer_timeout_ms must be at least 1".to_string());
        }
        if self.metrics_port == Some(0) {
            return Err("metrics_port cannot be 0".to_string());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Viewport size in pixels; asteroids spawn just beyond its half-extent
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
            seed: None,
        }
    }
}

/// Headless pilot configuration
#[derive(Debug, Clone)]
pub struct PilotConfig {
    /// Relay host; `None` flies offline
    pub relay_host: Option<String>,
    pub relay_port: u16,
    pub saves_dir: PathBuf,
    pub settings_file: PathBuf,
    pub world_name: String,
    /// How long the autopilot flies before saving and exiting
    pub pilot_seconds: u64,
    pub sim: SimConfig,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            relay_host: None,
            relay_port: DEFAULT_PORT,
            saves_dir: PathBuf::from("saves"),
            settings_file: PathBuf::from("settings.json"),
            world_name: "pilot".to_string(),
            pilot_seconds: 30,
            sim: SimConfig::default(),
        }
    }
}

impl PilotConfig {
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("RELAY_HOST") {
            if !host.trim().is_empty() {
                config.relay_host = Some(host);
            }
        }
        if let Some(port) = env_parse::<u16>("RELAY_PORT") {
            if port > 0 {
                config.relay_port = port;
            } else {
                tracing::warn!("RELAY_PORT must be > 0, using default");
            }
        }
        if let Ok(dir) = std::env::var("SAVES_DIR") {
            config.saves_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("SETTINGS_FILE") {
            config.settings_file = PathBuf::from(file);
        }
        if let Ok(name) = std::env::var("WORLD_NAME") {
            if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') && !name.is_empty() {
                config.world_name = name;
            } else {
                tracing::warn!("Invalid WORLD_NAME '{}', using default", name);
            }
        }
        if let Some(seconds) = env_parse("PILOT_SECONDS") {
            config.pilot_seconds = seconds;
        }
        if let Some(width) = env_parse::<u32>("VIEWPORT_WIDTH") {
            if width > 0 {
                config.sim.viewport_width = width;
            }
        }
        if let Some(height) = env_parse::<u32>("VIEWPORT_HEIGHT") {
            if height > 0 {
                config.sim.viewport_height = height;
            }
        }
        config.sim.seed = env_parse("SIM_SEED");

        config
    }
}
