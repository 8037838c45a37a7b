//! Bullet firing and flight
//!
//! Bullets inherit the ship's velocity. Auto-aim steers each bullet toward
//! the nearest asteroid in range before it is integrated.

use rayon::prelude::*;

use crate::game::constants::bullet::{NOSE_OFFSET, SPEED};
use crate::game::powers::{AIM_GAIN, AIM_TRACKING_RADIUS};
use crate::game::state::{Asteroid, Bullet, WorldState};
use crate::util::vec2::Vec2;

/// Accumulate the shot timer and fire if the trigger is held and the cooldown has elapsed
pub fn update_trigger(state: &mut WorldState, fire: bool, dt: f32) -> bool {
    state.time_since_shot += dt;
    if !fire || state.time_since_shot < state.fire_cooldown() {
        return false;
    }
    state.time_since_shot = 0.0;
    fire_from_nose(state);
    true
}

/// Spawn one bullet at the ship nose
pub fn fire_from_nose(state: &mut WorldState) {
    let heading = Vec2::heading(state.rotation);
    let position = state.camera + heading * NOSE_OFFSET;
    let velocity = heading * SPEED + state.camera_velocity;
    let id = state.next_entity_id();
    state.bullets.push(Bullet::new(id, position, velocity));
}

fn nearest_in_range(asteroids: &[Asteroid], from: Vec2) -> Option<Vec2> {
    let mut best = None;
    let mut best_dist = AIM_TRACKING_RADIUS;
    for asteroid in asteroids {
        let dist = asteroid.position.distance_to(from);
        if dist < best_dist {
            best_dist = dist;
            best = Some(asteroid.position);
        }
    }
    best
}

/// Steer (if auto-aim is equipped), move, age, and expire bullets
pub fn advance_bullets(state: &mut WorldState, dt: f32) {
    let aim = state.powers.aim_strength();
    let asteroids = &state.asteroids;

    state.bullets.par_iter_mut().for_each(|bullet| {
        if let Some(strength) = aim {
            if let Some(target) = nearest_in_range(asteroids, bullet.position) {
                let to_target = target - bullet.position;
                if to_target.length_sq() > 0.0 {
                    let desired = to_target.normalize() * SPEED;
                    bullet.velocity += (desired - bullet.velocity) * (strength * dt * AIM_GAIN);
                }
            }
        }
        bullet.position += bullet.velocity * dt;
        bullet.lifetime -= dt;
    });

    state.bullets.retain(|b| !b.is_expired());
}
