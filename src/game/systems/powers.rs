//! Continuous power effects: damage orbs circling the ship

use crate::game::powers::{PowerEffect, ORB_ANGULAR_SPEED, ORB_HIT_RADIUS};
use crate::game::state::WorldState;
use crate::game::systems::collision::circles_overlap;
use crate::util::vec2::Vec2;

/// World positions of the current orbs
pub fn orb_positions(state: &WorldState, orbit_radius: f32) -> impl Iterator<Item = Vec2> + '_ {
    let center = state.camera;
    state
        .orb_angles
        .iter()
        .map(move |&angle| center + Vec2::from_angle(angle) * orbit_radius)
}

/// Re-derive orbs from the equipped power, advance them, and apply damage over time
pub fn update(state: &mut WorldState, dt: f32) {
    let Some(PowerEffect::DamageOrbs {
        count,
        orbit_radius,
        damage_per_second,
    }) = state.powers.effect()
    else {
        state.orb_angles.clear();
        return;
    };

    if state.orb_angles.len() != count {
        state.orb_angles = (0..count)
            .map(|i| i as f32 / count as f32 * std::f32::consts::TAU)
            .collect();
    }
    for angle in state.orb_angles.iter_mut() {
        *angle += ORB_ANGULAR_SPEED * dt;
    }

    let orbs: Vec<Vec2> = orb_positions(state, orbit_radius).collect();
    let tick_damage = damage_per_second * dt;
    for asteroid in state.asteroids.iter_mut() {
        for orb in &orbs {
            if circles_overlap(*orb, ORB_HIT_RADIUS, asteroid.position, asteroid.radius) {
                asteroid.health -= tick_damage;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::powers::PowerKind;
    use crate::game::state::Asteroid;

    fn with_orbs(level: u32) -> WorldState {
        let mut state = WorldState::default();
        state.powers.owned.push(PowerKind::DamageOrbs);
        state.powers.levels.insert(PowerKind::DamageOrbs, level);
        state.powers.equipped = Some(PowerKind::DamageOrbs);
        state
    }

    #[test]
    fn test_orb_count_follows_level() {
        let mut state = with_orbs(3);
        update(&mut state, 0.0);
        assert_eq!(state.orb_angles.len(), 5);

        state.powers.levels.insert(PowerKind::DamageOrbs, 1);
        update(&mut state, 0.0);
        assert_eq!(state.orb_angles.len(), 3);
    }

    #[test]
    fn test_orbs_cleared_when_unequipped() {
        let mut state = with_orbs(1);
        update(&mut state, 0.1);
        state.powers.equipped = None;
        update(&mut state, 0.1);
        assert!(state.orb_angles.is_empty());
    }

    #[test]
    fn test_orb_damage_over_time() {
        let mut state = with_orbs(0);
        // level 0: 2 orbs at radius 60, first starts on +x
        state
            .asteroids
            .push(Asteroid::new(1, Vec2::new(60.0, 0.0), Vec2::ZERO, 10.0, 8.0, false, false));
        update(&mut state, 0.01);
        let expected = 10.0 - 3.0 * 0.01;
        assert!((state.asteroids[0].health - expected).abs() < 1e-4);
    }

    #[test]
    fn test_orbs_advance() {
        let mut state = with_orbs(0);
        update(&mut state, 0.5);
        assert!((state.orb_angles[0] - 1.0).abs() < 1e-5);
    }
}
