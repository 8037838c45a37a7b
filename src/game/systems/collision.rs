//! Circle collision resolution
//!
//! Ship hits are elastic reflections of both bodies across the contact
//! normal. Asteroid pairs only lose their along-normal velocity.

use crate::game::constants::ship;
use crate::game::state::WorldState;
use crate::util::vec2::Vec2;

/// Reflect ship and asteroid velocities on overlap, then push the asteroid out
pub fn resolve_ship_hits(state: &mut WorldState) {
    let camera = state.camera;
    let mut ship_velocity = state.camera_velocity;

    for asteroid in state.asteroids.iter_mut() {
        let (normal, dist) = (asteroid.position - camera).normal_and_length();
        let min_dist = ship::RADIUS + asteroid.radius;
        if dist >= min_dist {
            continue;
        }

        asteroid.velocity = asteroid.velocity.reflect(normal);
        ship_velocity = ship_velocity.reflect(normal);

        let overlap = min_dist - dist;
        asteroid.position += normal * (overlap * ship::SEPARATION_FACTOR);
    }

    state.camera_velocity = ship_velocity;
}

/// Pairwise (i < j) asteroid overlap: cancel normal velocity, split the overlap
pub fn resolve_asteroid_pairs(state: &mut WorldState) {
    let asteroids = &mut state.asteroids;
    let n = asteroids.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let delta = asteroids[i].position - asteroids[j].position;
            let dist = delta.length();
            let min_dist = asteroids[i].radius + asteroids[j].radius;
            if dist >= min_dist || dist <= 0.0 {
                continue;
            }

            let normal = delta * (1.0 / dist);
            let half = normal * ((min_dist - dist) / 2.0);

            let (head, tail) = asteroids.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];
            a.velocity = a.velocity.without_component(normal);
            b.velocity = b.velocity.without_component(normal);
            a.position += half;
            b.position -= half;
        }
    }
}

/// Squared-distance circle test
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_sq_to(b) < r * r
}
