//! Asteroid spawning
//!
//! Spawn attempts run on a fixed timer. Density falls off with distance
//! from the base anchor while size, health and boss odds grow with it.

use rand::Rng;

use crate::config::SimConfig;
use crate::game::constants::{asteroid::*, world::BASE};
use crate::game::state::{Asteroid, WorldState};
use crate::util::vec2::Vec2;

/// Probability that a spawn attempt at `base_dist` from the base succeeds
pub fn spawn_chance(base_dist: f32) -> f32 {
    let chance = (-base_dist / SPAWN_DECAY).exp().max(SPAWN_CHANCE_FLOOR);
    if base_dist > FAR_DISTANCE {
        (chance * FAR_BOOST).min(FAR_CHANCE_CAP)
    } else {
        chance
    }
}

pub fn size_scale(base_dist: f32) -> f32 {
    (1.0 + base_dist / SCALE_DISTANCE).min(MAX_SCALE)
}

pub fn boss_probability(base_dist: f32) -> f32 {
    (BOSS_PROB_BASE + base_dist / BOSS_PROB_DISTANCE).min(BOSS_PROB_CAP)
}

/// Roll an asteroid at `position`, scaled by its distance from the base
pub fn roll_asteroid<R: Rng + ?Sized>(rng: &mut R, id: u64, position: Vec2) -> Asteroid {
    let base_dist = position.distance_to(BASE);
    let scale = size_scale(base_dist);
    let boss = rng.gen::<f32>() < boss_probability(base_dist) && base_dist > BOSS_MIN_DISTANCE;

    let (health, radius) = if boss {
        let health = (BOSS_BASE_HEALTH * scale * rng.gen_range(0.8..1.2)).floor();
        let radius = ((BOSS_BASE_RADIUS + base_dist / BOSS_RADIUS_DISTANCE) * rng.gen_range(0.9..1.1)).floor();
        (health, radius)
    } else {
        let base_health = rng.gen_range(MIN_HEALTH..=MAX_HEALTH) as f32;
        let health = (base_health * scale * rng.gen_range(0.9..1.1)).floor();
        let radius = ((BASE_RADIUS + base_dist / RADIUS_DISTANCE) * rng.gen_range(0.9..1.1)).floor();
        (health, radius)
    };

    let velocity = Vec2::new(rng.gen_range(-DRIFT..DRIFT), rng.gen_range(-DRIFT..DRIFT));
    let golden = rng.gen_bool(GOLDEN_CHANCE);
    Asteroid::new(
        id,
        position,
        velocity,
        health.max(1.0),
        radius.clamp(MIN_RADIUS, MAX_RADIUS),
        boss,
        golden,
    )
}

/// Advance the spawn timer; on expiry try once to add an asteroid off-screen
pub fn update<R: Rng + ?Sized>(state: &mut WorldState, rng: &mut R, config: &SimConfig, dt: f32) {
    state.spawn_timer += dt;
    if state.spawn_timer < SPAWN_INTERVAL {
        return;
    }
    state.spawn_timer = 0.0;

    if state.asteroids.len() >= MAX_COUNT {
        return;
    }

    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let half_view = (config.viewport_width.max(config.viewport_height) / 2) as f32;
    let distance = half_view + rng.gen_range(SPAWN_MARGIN_MIN..=SPAWN_MARGIN_MAX) as f32;
    let position = state.camera + Vec2::from_angle(angle) * distance;

    if rng.gen::<f32>() > spawn_chance(position.distance_to(BASE)) {
        return;
    }

    let id = state.next_entity_id();
    let asteroid = roll_asteroid(rng, id, position);
    if asteroid.boss {
        tracing::debug!(id, radius = asteroid.radius, "Boss asteroid spawned");
    }
    state.asteroids.push(asteroid);
}
