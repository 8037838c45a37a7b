//! Tick orchestrator
//!
//! `GameLoop` owns the world, its seeded RNG, and the simulation config.
//! A tick runs every system in a fixed order; the order matters because
//! destruction is swept once after all damage sources have applied.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SimConfig;
use crate::game::cosmetics::CosmeticCategory;
use crate::game::events::GameEvent;
use crate::game::input::ShipInput;
use crate::game::loot::Material;
use crate::game::powers::PowerKind;
use crate::game::quest::QuestReward;
use crate::game::state::{UpgradeKind, WorldState};
use crate::game::systems::{asteroids, cargo, collision, combat, economy, physics, powers, projectile, quests};
use crate::game::ShopError;

pub struct GameLoop {
    state: WorldState,
    config: SimConfig,
    rng: StdRng,
    tick: u64,
}

impl GameLoop {
    /// Start a fresh world
    pub fn new(config: SimConfig) -> Self {
        let mut rng = Self::seeded(&config);
        let state = WorldState::new_world(&mut rng);
        Self {
            state,
            config,
            rng,
            tick: 0,
        }
    }

    /// Resume a loaded world. The state is normalized before the first tick.
    pub fn from_state(mut state: WorldState, config: SimConfig) -> Self {
        let mut rng = Self::seeded(&config);
        state.normalize(&mut rng);
        Self {
            state,
            config,
            rng,
            tick: 0,
        }
    }

    fn seeded(config: &SimConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    pub fn into_state(self) -> WorldState {
        self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    /// Advance the world by `dt` seconds under the given input
    pub fn tick(&mut self, dt: f32, input: &ShipInput) {
        let input = input.sanitized();
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let state = &mut self.state;
        let rng = &mut self.rng;

        // Movement
        physics::move_asteroids(state, dt);
        physics::steer_ship(state, &input, dt);

        // Weapons and powers
        projectile::update_trigger(state, input.fire, dt);
        projectile::advance_bullets(state, dt);
        powers::update(state, dt);

        // Contacts
        collision::resolve_ship_hits(state);
        collision::resolve_asteroid_pairs(state);

        // Cargo and loot
        cargo::swing(state, dt);
        cargo::update_floating_loot(state, rng, dt);

        // Damage resolution, then one destruction sweep
        combat::resolve_bullet_hits(state, rng);
        combat::sweep_destroyed(state, rng);

        asteroids::update(state, rng, &self.config, dt);

        economy::absorb_drop_zone_loot(state);
        if input.interact {
            if let Err(e) = economy::interact(state) {
                tracing::debug!("Interact ignored: {}", e);
            }
        }

        quests::update(state, rng, dt);
        self.tick += 1;
    }

    pub fn sell_cargo(&mut self) -> Result<f64, ShopError> {
        economy::sell_cargo(&mut self.state)
    }

    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> Result<f64, ShopError> {
        economy::buy_upgrade(&mut self.state, kind)
    }

    pub fn buy_power(&mut self, kind: PowerKind) -> Result<f64, ShopError> {
        economy::buy_power(&mut self.state, kind)
    }

    pub fn upgrade_power(&mut self, kind: PowerKind) -> Result<f64, ShopError> {
        economy::upgrade_power(&mut self.state, kind)
    }

    pub fn equip_power(&mut self, kind: Option<PowerKind>) -> Result<(), ShopError> {
        economy::equip_power(&mut self.state, kind)
    }

    pub fn equip_cosmetic(&mut self, category: CosmeticCategory, style: &str) -> Result<(), ShopError> {
        economy::equip_cosmetic(&mut self.state, category, style)
    }

    pub fn drop_item(&mut self, index: usize) -> Result<Material, ShopError> {
        economy::drop_item(&mut self.state, &mut self.rng, index)
    }

    pub fn deposit_cargo(&mut self) -> Result<usize, ShopError> {
        economy::deposit_cargo(&mut self.state)
    }

    pub fn claim_quest(&mut self, index: usize) -> Result<QuestReward, ShopError> {
        quests::claim(&mut self.state, index)
    }
}
