pub mod client;
pub mod protocol;
pub mod registry;
pub mod relay;

pub use client::{ConnectError, NetworkClient};
pub use protocol::{ClientMessage, PeerState, Pose, ServerMessage};
pub use registry::PeerRegistry;
pub use relay::Relay;
