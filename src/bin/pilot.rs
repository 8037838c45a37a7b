//! Headless pilot
//!
//! Flies a world with a scripted autopilot at 60 Hz: hunt the nearest
//! asteroid, return to base to sell when the hold is full, claim finished
//! quests and buy upgrades. Optionally shows up on a relay. The world is
//! saved on exit.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use asteroid_miner::config::PilotConfig;
use asteroid_miner::game::constants::{sim, world};
use asteroid_miner::game::events::GameEvent;
use asteroid_miner::game::game_loop::GameLoop;
use asteroid_miner::game::input::ShipInput;
use asteroid_miner::game::state::{UpgradeKind, WorldState};
use asteroid_miner::net::{NetworkClient, Pose};
use asteroid_miner::persistence::{PersistenceError, Settings, WorldStore};
use asteroid_miner::util::vec2::Vec2;

/// Heading error below which the autopilot fires
const AIM_TOLERANCE: f32 = 0.15;

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Turn and thrust toward `target`, firing when lined up
fn steer_toward(state: &WorldState, target: Vec2, fire: bool, interact: bool) -> ShipInput {
    let to_target = target - state.camera;
    let desired = to_target.x.atan2(-to_target.y);
    let error = wrap_angle(desired - state.rotation);
    let turn = (error * 2.0).clamp(-1.0, 1.0);
    let thrust = if error.abs() < 0.5 { 1.0 } else { 0.0 };
    ShipInput::new(turn, thrust, fire && error.abs() < AIM_TOLERANCE, interact)
}

fn autopilot(state: &WorldState) -> ShipInput {
    if state.storage_free() == 0 {
        return steer_toward(state, world::BASE, false, state.at_base());
    }
    let nearest = state
        .asteroids
        .iter()
        .min_by(|a, b| {
            let da = a.position.distance_sq_to(state.camera);
            let db = b.position.distance_sq_to(state.camera);
            da.total_cmp(&db)
        })
        .map(|a| a.position);
    match nearest {
        Some(target) => steer_toward(state, target, true, false),
        None => ShipInput::new(0.3, 0.5, false, false),
    }
}

fn spend_and_claim(game: &mut GameLoop) {
    while let Some(index) = game.state().quests.iter().position(|q| q.completed && !q.claimed) {
        let description = game.state().quests[index].description();
        match game.claim_quest(index) {
            Ok(reward) => info!(?reward, "Quest claimed: {}", description),
            Err(e) => {
                warn!("Quest claim failed: {}", e);
                break;
            }
        }
    }
    if game.state().at_base() {
        for kind in UpgradeKind::ALL {
            if let Ok(cost) = game.buy_upgrade(kind) {
                info!("Bought {:?} upgrade for {}", kind, cost);
            }
        }
    }
}

fn load_world(store: &WorldStore, config: &PilotConfig) -> anyhow::Result<GameLoop> {
    let mut rng = rand::thread_rng();
    match store.load(&config.world_name, &mut rng) {
        Ok(state) => {
            info!("Loaded world '{}'", config.world_name);
            Ok(GameLoop::from_state(state, config.sim.clone()))
        }
        Err(PersistenceError::NotFound(_)) => {
            info!("Starting new world '{}'", config.world_name);
            Ok(GameLoop::new(config.sim.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = PilotConfig::load_or_default();
    let settings = Settings::load(&config.settings_file);
    let store = WorldStore::new(&config.saves_dir);
    let mut game = load_world(&store, &config)?;

    let mut client = NetworkClient::new();
    if let Some(host) = &config.relay_host {
        if let Err(e) = client.connect(host, config.relay_port, &settings.player_name, settings.ship_color_index) {
            warn!("Could not reach relay {}:{}: {}, flying offline", host, config.relay_port, e);
        }
    }

    let total_ticks = config.pilot_seconds * sim::TICK_RATE as u64;
    let mut ticker = tokio::time::interval(Duration::from_millis(sim::TICK_DURATION_MS));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("{} flying for {}s", settings.player_name, config.pilot_seconds);
    let mut destroyed = 0u32;

    for tick in 0..total_ticks {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Interrupted, saving");
                break;
            }
        }

        let input = autopilot(game.state());
        game.tick(sim::DT, &input);
        for event in game.drain_events() {
            match event {
                GameEvent::AsteroidDestroyed { .. } => destroyed += 1,
                GameEvent::LevelUp { level } => info!("Reached level {}", level),
                GameEvent::PowersUnlocked => info!("Powers unlocked"),
                _ => {}
            }
        }
        spend_and_claim(&mut game);

        let state = game.state();
        client.pump(
            sim::DT,
            Pose {
                x: state.camera.x,
                y: state.camera.y,
                rotation: state.rotation,
                color_index: settings.ship_color_index,
            },
        );

        if tick % (5 * sim::TICK_RATE as u64) == 0 {
            info!(
                "pos=({:.0},{:.0}) currency={:.2} cargo={} asteroids={} destroyed={} peers={}",
                state.camera.x,
                state.camera.y,
                state.currency,
                state.carried_items.len(),
                state.asteroids.len(),
                destroyed,
                client.other_players().len()
            );
        }
    }

    client.disconnect();
    store.save(&config.world_name, game.state())?;
    info!("Saved world '{}' to {}", config.world_name, store.dir().display());
    Ok(())
}
