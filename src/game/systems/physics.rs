use rayon::prelude::*;

use crate::game::constants::{asteroid::DESPAWN_RADIUS, ship};
use crate::game::input::ShipInput;
use crate::game::state::WorldState;
use crate::util::vec2::Vec2;

/// Turn, thrust, clamp, friction, integrate.
///
/// Friction is exponential decay applied every tick, thrust or not, so the
/// ship drifts to a stop rather than halting.
pub fn steer_ship(state: &mut WorldState, input: &ShipInput, dt: f32) {
    state.rotation += input.turn * ship::ROT_SPEED * dt;

    if input.thrust > ship::THRUST_DEADZONE {
        let accel = state.upgrades.accel();
        state.camera_velocity += Vec2::heading(state.rotation) * (accel * dt);
    }

    let max_speed = state.upgrades.max_speed();
    state.camera_velocity = state.camera_velocity.clamp_axes(max_speed);
    let friction = (ship::FRICTION * dt).min(1.0);
    state.camera_velocity -= state.camera_velocity * friction;

    let before = state.camera;
    state.camera += state.camera_velocity * dt;
    state.travel_accum += before.distance_to(state.camera);
}

/// Linear drift for every asteroid, then drop the ones far from the camera
pub fn move_asteroids(state: &mut WorldState, dt: f32) {
    state.asteroids.par_iter_mut().for_each(|asteroid| {
        asteroid.position += asteroid.velocity * dt;
    });

    let camera = state.camera;
    let despawn_sq = DESPAWN_RADIUS * DESPAWN_RADIUS;
    state
        .asteroids
        .retain(|a| a.position.distance_sq_to(camera) <= despawn_sq);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::sim::DT;
    use crate::game::state::Asteroid;

    const EPSILON: f32 = 1e-3;

    fn thrust() -> ShipInput {
        ShipInput::new(0.0, 1.0, false, false)
    }

    #[test]
    fn test_thrust_moves_up_at_zero_heading() {
        let mut state = WorldState::default();
        steer_ship(&mut state, &thrust(), DT);
        assert!(state.camera_velocity.y < 0.0);
        assert!(state.camera_velocity.x.abs() < EPSILON);
        assert!(state.camera.y < 0.0);
    }

    #[test]
    fn test_deadzone_ignores_small_thrust() {
        let mut state = WorldState::default();
        steer_ship(&mut state, &ShipInput::new(0.0, 0.15, false, false), DT);
        assert_eq!(state.camera_velocity, Vec2::ZERO);
    }

    #[test]
    fn test_friction_decays_without_thrust() {
        let mut state = WorldState::default();
        state.camera_velocity = Vec2::new(300.0, 0.0);
        steer_ship(&mut state, &ShipInput::default(), DT);
        let expected = 300.0 * (1.0 - 6.0 * DT);
        assert!((state.camera_velocity.x - expected).abs() < EPSILON);
        assert!(state.camera_velocity.x > 0.0);
    }

    #[test]
    fn test_friction_never_reverses() {
        let mut state = WorldState::default();
        state.camera_velocity = Vec2::new(300.0, -200.0);
        steer_ship(&mut state, &ShipInput::default(), 1.0);
        assert_eq!(state.camera_velocity, Vec2::ZERO);
    }

    #[test]
    fn test_velocity_clamped_per_axis() {
        let mut state = WorldState::default();
        state.camera_velocity = Vec2::new(5000.0, -5000.0);
        steer_ship(&mut state, &ShipInput::default(), DT);
        let limit = 800.0 * (1.0 - 6.0 * DT);
        assert!((state.camera_velocity.x - limit).abs() < EPSILON);
        assert!((state.camera_velocity.y + limit).abs() < EPSILON);
    }

    #[test]
    fn test_turn_rate() {
        let mut state = WorldState::default();
        steer_ship(&mut state, &ShipInput::new(1.0, 0.0, false, false), 0.5);
        assert!((state.rotation - std::f32::consts::FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_travel_accumulates() {
        let mut state = WorldState::default();
        state.camera_velocity = Vec2::new(600.0, 0.0);
        steer_ship(&mut state, &ShipInput::default(), DT);
        assert!((state.travel_accum - state.camera.x).abs() < EPSILON);
    }

    #[test]
    fn test_asteroids_drift_and_despawn() {
        let mut state = WorldState::default();
        state.asteroids.push(Asteroid::new(1, Vec2::new(100.0, 0.0), Vec2::new(60.0, 0.0), 10.0, 8.0, false, false));
        state.asteroids.push(Asteroid::new(2, Vec2::new(1199.0, 0.0), Vec2::new(120.0, 0.0), 10.0, 8.0, false, false));
        move_asteroids(&mut state, 0.5);
        assert_eq!(state.asteroids.len(), 1);
        assert_eq!(state.asteroids[0].id, 1);
        assert!((state.asteroids[0].position.x - 130.0).abs() < EPSILON);
    }
}
