//! Carried cargo pendulums and floating-loot pickup

use rand::Rng;
use rayon::prelude::*;
use smallvec::SmallVec;

use crate::game::constants::{cargo::*, loot};
use crate::game::events::GameEvent;
use crate::game::loot::Material;
use crate::game::quest::QuestEvent;
use crate::game::state::{CarriedItem, WorldState};
use crate::util::vec2::Vec2;

/// Damped-pendulum swing for every carried item, then soft pairwise repulsion.
///
/// Rest angle is PI (directly behind). The ship's sideways velocity couples
/// into the pendulum so cargo swings out on turns.
pub fn swing(state: &mut WorldState, dt: f32) {
    let lateral = state.camera_velocity.dot(Vec2::starboard(state.rotation));
    let rest = std::f32::consts::PI;

    for item in state.carried_items.iter_mut() {
        let ang_acc = -SPRING * (item.rel_angle - rest) - DAMPING * item.ang_vel - lateral * COUPLING;
        item.ang_vel += ang_acc * dt;
        item.rel_angle += item.ang_vel * dt;
    }

    let rotation = state.rotation;
    let offsets: SmallVec<[Vec2; 32]> = state.carried_items.iter().map(|i| i.offset(rotation)).collect();
    let min_dist = ITEM_RADIUS * 2.0;
    for i in 0..offsets.len() {
        for j in (i + 1)..offsets.len() {
            let dist = offsets[i].distance_to(offsets[j]);
            if dist < min_dist && dist > 0.0 {
                let push = PUSH * (min_dist - dist) / dist;
                state.carried_items[i].ang_vel -= push;
                state.carried_items[j].ang_vel += push;
            }
        }
    }
}

/// Move a material into the cargo hold
pub fn collect<R: Rng + ?Sized>(state: &mut WorldState, rng: &mut R, material: Material) {
    state.carried_items.push(CarriedItem::picked_up(rng, material));
    state.emit(GameEvent::ItemCollected { material });
    state.record_quest(QuestEvent::Collected(material));
}

/// Drift, magnet pull, pickup, and expiry of floating loot.
///
/// Loot within the pickup radius, or within magnet range when a magnet is
/// equipped, is captured while there is storage space and the post-drop
/// cooldown has elapsed. Loot in magnet range that cannot be stored is pulled
/// toward the ship instead.
pub fn update_floating_loot<R: Rng + ?Sized>(state: &mut WorldState, rng: &mut R, dt: f32) {
    if state.drop_cooldown > 0.0 {
        state.drop_cooldown -= dt;
    }

    let camera = state.camera;
    let magnet = state.powers.magnet();

    state.floating_loot.par_iter_mut().for_each(|item| {
        item.velocity *= loot::FRICTION;
        if let Some((range, strength)) = magnet {
            let to_ship = camera - item.position;
            let dist = to_ship.length();
            if dist < range && dist > 1.0 {
                let pull = strength / (dist + 10.0);
                item.velocity += to_ship * (pull * dt / dist);
            }
        }
        item.position += item.velocity * dt;
        if !item.is_infinite() {
            item.lifetime -= dt;
        }
    });

    let reach = magnet.map_or(loot::PICKUP_RADIUS, |(range, _)| range.max(loot::PICKUP_RADIUS));
    let can_pickup = state.drop_cooldown <= 0.0;
    let mut free = state.storage_free();
    let mut captured: SmallVec<[Material; 8]> = SmallVec::new();

    state.floating_loot.retain(|item| {
        if can_pickup && free > 0 && item.position.distance_to(camera) < reach {
            free -= 1;
            captured.push(item.material);
            return false;
        }
        !item.is_expired()
    });

    for material in captured {
        collect(state, rng, material);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::powers::PowerKind;
    use crate::game::state::FloatingLoot;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-4;

    fn item(rel_angle: f32) -> CarriedItem {
        CarriedItem {
            material: Material::Iron,
            rel_angle,
            ang_vel: 0.0,
            length: 55.0,
            color: Material::Iron.color(),
        }
    }

    fn loot_at(x: f32) -> FloatingLoot {
        FloatingLoot::new(Material::Copper, Vec2::new(x, 0.0), Vec2::ZERO)
    }

    #[test]
    fn test_pendulum_at_rest_stays() {
        let mut state = WorldState::default();
        state.carried_items.push(item(PI));
        swing(&mut state, 1.0 / 60.0);
        assert!((state.carried_items[0].rel_angle - PI).abs() < EPSILON);
    }

    #[test]
    fn test_pendulum_restores_toward_rest() {
        let mut state = WorldState::default();
        state.carried_items.push(item(PI + 0.5));
        swing(&mut state, 1.0 / 60.0);
        assert!(state.carried_items[0].ang_vel < 0.0);
    }

    #[test]
    fn test_lateral_velocity_swings_cargo() {
        let mut state = WorldState::default();
        state.carried_items.push(item(PI));
        state.camera_velocity = Vec2::new(400.0, 0.0);
        swing(&mut state, 1.0 / 60.0);
        assert!(state.carried_items[0].ang_vel < 0.0);
    }

    #[test]
    fn test_overlapping_items_pushed_apart() {
        let mut state = WorldState::default();
        state.carried_items.push(item(PI));
        state.carried_items.push(item(PI + 0.05));
        swing(&mut state, 1.0 / 60.0);
        assert!(state.carried_items[0].ang_vel < state.carried_items[1].ang_vel);
    }

    #[test]
    fn test_proximity_pickup() {
        let mut state = WorldState::default();
        let mut rng = StdRng::seed_from_u64(1);
        state.floating_loot.push(loot_at(20.0));
        state.floating_loot.push(loot_at(80.0));
        update_floating_loot(&mut state, &mut rng, 1.0 / 60.0);
        assert_eq!(state.floating_loot.len(), 1);
        assert_eq!(state.carried_items.len(), 1);
        assert!(matches!(state.events[0], GameEvent::ItemCollected { material: Material::Copper }));
    }

    #[test]
    fn test_drop_cooldown_blocks_pickup() {
        let mut state = WorldState::default();
        let mut rng = StdRng::seed_from_u64(1);
        state.drop_cooldown = 1.0;
        state.floating_loot.push(loot_at(5.0));
        update_floating_loot(&mut state, &mut rng, 1.0 / 60.0);
        assert_eq!(state.floating_loot.len(), 1);
        assert!(state.carried_items.is_empty());
    }

    #[test]
    fn test_full_storage_leaves_loot() {
        let mut state = WorldState::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..state.storage_capacity() {
            state.carried_items.push(item(PI));
        }
        state.floating_loot.push(loot_at(5.0));
        update_floating_loot(&mut state, &mut rng, 1.0 / 60.0);
        assert_eq!(state.floating_loot.len(), 1);
        assert_eq!(state.carried_items.len(), 5);
    }

    #[test]
    fn test_magnet_level_one_captures_in_range() {
        let mut state = WorldState::default();
        let mut rng = StdRng::seed_from_u64(1);
        state.powers.owned.push(PowerKind::Magnet);
        state.powers.levels.insert(PowerKind::Magnet, 1);
        state.powers.equipped = Some(PowerKind::Magnet);
        state.floating_loot.push(loot_at(180.0));
        update_floating_loot(&mut state, &mut rng, 1.0 / 60.0);
        assert!(state.floating_loot.is_empty());
        assert_eq!(state.carried_items.len(), 1);
        assert_eq!(state.carried_items[0].material, Material::Copper);
    }

    #[test]
    fn test_magnet_pulls_when_full() {
        let mut state = WorldState::default();
        let mut rng = StdRng::seed_from_u64(1);
        state.powers.owned.push(PowerKind::Magnet);
        state.powers.levels.insert(PowerKind::Magnet, 1);
        state.powers.equipped = Some(PowerKind::Magnet);
        for _ in 0..state.storage_capacity() {
            state.carried_items.push(item(PI));
        }
        state.floating_loot.push(loot_at(100.0));
        update_floating_loot(&mut state, &mut rng, 1.0 / 60.0);
        assert!(state.floating_loot[0].velocity.x < 0.0);
    }

    #[test]
    fn test_expiry_and_infinite_lifetime() {
        let mut state = WorldState::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut short = loot_at(500.0);
        short.lifetime = 0.01;
        let mut forever = loot_at(600.0);
        forever.lifetime = loot::INFINITE_LIFETIME;
        state.floating_loot.push(short);
        state.floating_loot.push(forever);
        update_floating_loot(&mut state, &mut rng, 1.0 / 60.0);
        assert_eq!(state.floating_loot.len(), 1);
        assert_eq!(state.floating_loot[0].lifetime, loot::INFINITE_LIFETIME);
    }

    #[test]
    fn test_loot_friction() {
        let mut state = WorldState::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut drifting = loot_at(500.0);
        drifting.velocity = Vec2::new(100.0, 0.0);
        state.floating_loot.push(drifting);
        update_floating_loot(&mut state, &mut rng, 1.0 / 60.0);
        assert!((state.floating_loot[0].velocity.x - 95.0).abs() < EPSILON);
    }
}
