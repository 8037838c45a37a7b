//! Asteroid Miner
//!
//! A single-player asteroid mining simulation with an optional UDP presence
//! relay. The library holds the simulation (`game`), its persistence, and
//! both ends of the relay protocol (`net`).

pub mod config;
pub mod game;
pub mod metrics;
pub mod net;
pub mod persistence;
pub mod util;
