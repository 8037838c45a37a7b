//! Bullet hits, on-hit power effects, and asteroid destruction

use rand::Rng;
use smallvec::SmallVec;

use crate::game::constants::{bullet::HIT_RADIUS, loot};
use crate::game::events::GameEvent;
use crate::game::loot::{roll_drops, Material};
use crate::game::powers::PowerEffect;
use crate::game::quest::QuestEvent;
use crate::game::state::{Bullet, FloatingLoot, WorldState};
use crate::game::systems::collision::circles_overlap;
use crate::util::vec2::Vec2;

/// Apply bullet hits against every asteroid.
///
/// A bullet that hits is consumed unless it still has pierce budget left.
/// Split fragments are queued and only join the bullet list after the pass.
pub fn resolve_bullet_hits<R: Rng + ?Sized>(state: &mut WorldState, rng: &mut R) {
    if state.bullets.is_empty() || state.asteroids.is_empty() {
        return;
    }

    let damage = state.upgrades.bullet_damage();
    let effect = state.powers.effect();
    let pierce_budget = state.powers.pierce_budget();

    let mut spent = vec![false; state.bullets.len()];
    let mut fragments: SmallVec<[Bullet; 8]> = SmallVec::new();

    for ai in 0..state.asteroids.len() {
        for bi in 0..state.bullets.len() {
            if spent[bi] || state.asteroids[ai].is_destroyed() {
                continue;
            }
            let target = &state.asteroids[ai];
            let bullet = &state.bullets[bi];
            if bullet.ignore == Some(target.id) {
                continue;
            }
            if !circles_overlap(bullet.position, HIT_RADIUS, target.position, target.radius) {
                continue;
            }

            let center = target.position;
            let source_id = target.id;
            state.asteroids[ai].health -= damage;

            match effect {
                Some(PowerEffect::BulletSplit { count, speed, lifetime }) => {
                    for _ in 0..count {
                        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                        let id = state.next_entity_id();
                        let mut fragment = Bullet::new(id, center, Vec2::from_angle(angle) * speed);
                        fragment.lifetime = lifetime;
                        fragment.ignore = Some(source_id);
                        fragments.push(fragment);
                    }
                }
                Some(PowerEffect::Explosive { radius, damage }) => {
                    for (oi, other) in state.asteroids.iter_mut().enumerate() {
                        if oi == ai {
                            continue;
                        }
                        let d = other.position.distance_to(center);
                        if d < radius {
                            other.health -= damage * (1.0 - 0.5 * d / radius);
                        }
                    }
                }
                _ => {}
            }

            let bullet = &mut state.bullets[bi];
            if bullet.pierce_count < pierce_budget {
                bullet.pierce_count += 1;
            } else {
                spent[bi] = true;
            }
        }
    }

    let mut flags = spent.into_iter();
    state.bullets.retain(|_| !flags.next().unwrap_or(false));
    state.bullets.extend(fragments);
}

/// Remove every asteroid at or below zero health, dropping its loot
pub fn sweep_destroyed<R: Rng + ?Sized>(state: &mut WorldState, rng: &mut R) {
    if !state.asteroids.iter().any(|a| a.is_destroyed()) {
        return;
    }

    let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.asteroids)
        .into_iter()
        .partition(|a| a.is_destroyed());
    state.asteroids = alive;

    for asteroid in dead {
        if asteroid.boss {
            tracing::debug!(id = asteroid.id, "Boss asteroid destroyed");
        }
        state.emit(GameEvent::AsteroidDestroyed {
            id: asteroid.id,
            position: asteroid.position,
            boss: asteroid.boss,
            golden: asteroid.golden,
        });
        state.record_quest(QuestEvent::AsteroidDestroyed {
            boss: asteroid.boss,
            golden: asteroid.golden,
        });

        let drops = roll_drops(rng, asteroid.boss, asteroid.golden, asteroid.max_health, asteroid.radius);
        let mut seen: SmallVec<[Material; 8]> = SmallVec::new();
        for material in drops {
            state.floating_loot.push(FloatingLoot::scattered(
                rng,
                material,
                asteroid.position,
                loot::DROP_SPEED_MIN,
                loot::DROP_SPEED_MAX,
            ));
            state.emit(GameEvent::LootDropped {
                material,
                position: asteroid.position,
            });
            if !seen.contains(&material) {
                seen.push(material);
            }
        }

        for material in seen {
            let color = if material == Material::PowerCore {
                Material::PowerCore.color()
            } else {
                [255, 255, 80]
            };
            state.emit(GameEvent::FloatingText {
                text: format!("+1 {}", material),
                position: asteroid.position,
                color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::powers::PowerKind;
    use crate::game::state::Asteroid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_state() -> (WorldState, StdRng) {
        (WorldState::default(), StdRng::seed_from_u64(42))
    }

    fn equip(state: &mut WorldState, kind: PowerKind, level: u32) {
        state.powers.owned.push(kind);
        state.powers.levels.insert(kind, level);
        state.powers.equipped = Some(kind);
    }

    fn rock(id: u64, x: f32, health: f32) -> Asteroid {
        Asteroid::new(id, Vec2::new(x, 0.0), Vec2::ZERO, health, 8.0, false, false)
    }

    fn bullet_at(id: u64, x: f32) -> Bullet {
        Bullet::new(id, Vec2::new(x, 0.0), Vec2::new(900.0, 0.0))
    }

    #[test]
    fn test_hit_damages_and_consumes() {
        let (mut state, mut rng) = create_test_state();
        state.upgrades.shot_damage = 2;
        state.asteroids.push(rock(1, 0.0, 10.0));
        state.bullets.push(bullet_at(2, 5.0));
        resolve_bullet_hits(&mut state, &mut rng);
        assert_eq!(state.asteroids[0].health, 7.0);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_miss_keeps_bullet() {
        let (mut state, mut rng) = create_test_state();
        state.asteroids.push(rock(1, 0.0, 10.0));
        state.bullets.push(bullet_at(2, 14.0));
        resolve_bullet_hits(&mut state, &mut rng);
        assert_eq!(state.asteroids[0].health, 10.0);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_pierce_never_exceeds_budget() {
        let (mut state, mut rng) = create_test_state();
        equip(&mut state, PowerKind::PiercingShots, 2);
        for id in 0..5 {
            state.asteroids.push(rock(id, 0.0, 100.0));
        }
        state.bullets.push(bullet_at(99, 0.0));
        resolve_bullet_hits(&mut state, &mut rng);
        // two pierces, then consumed on the third hit
        assert!(state.bullets.is_empty());
        let hit = state.asteroids.iter().filter(|a| a.health < 100.0).count();
        assert_eq!(hit, 3);
    }

    #[test]
    fn test_pierce_counter_retained_on_survivor() {
        let (mut state, mut rng) = create_test_state();
        equip(&mut state, PowerKind::PiercingShots, 3);
        state.asteroids.push(rock(1, 0.0, 100.0));
        state.bullets.push(bullet_at(99, 0.0));
        resolve_bullet_hits(&mut state, &mut rng);
        assert_eq!(state.bullets[0].pierce_count, 1);
        assert!(state.bullets[0].pierce_count <= state.powers.pierce_budget());
    }

    #[test]
    fn test_split_fragments_ignore_source() {
        let (mut state, mut rng) = create_test_state();
        equip(&mut state, PowerKind::BulletSplit, 2);
        state.asteroids.push(rock(1, 0.0, 100.0));
        state.bullets.push(bullet_at(99, 0.0));
        resolve_bullet_hits(&mut state, &mut rng);

        assert_eq!(state.bullets.len(), 3);
        for fragment in &state.bullets {
            assert_eq!(fragment.ignore, Some(1));
            assert_eq!(fragment.lifetime, 1.0);
            assert!((fragment.velocity.length() - 630.0).abs() < 1e-2);
        }

        // fragments sit on the asteroid but cannot hit it
        resolve_bullet_hits(&mut state, &mut rng);
        assert_eq!(state.asteroids[0].health, 99.0);
        assert_eq!(state.bullets.len(), 3);
    }

    #[test]
    fn test_explosion_falloff() {
        let (mut state, mut rng) = create_test_state();
        equip(&mut state, PowerKind::ExplosiveShots, 0);
        state.asteroids.push(rock(1, 0.0, 100.0));
        state.asteroids.push(rock(2, 25.0, 100.0));
        state.asteroids.push(rock(3, 60.0, 100.0));
        state.bullets.push(bullet_at(99, -5.0));
        resolve_bullet_hits(&mut state, &mut rng);

        assert_eq!(state.asteroids[0].health, 99.0);
        // radius 50, damage 2, halfway => 2 * 0.75
        assert!((state.asteroids[1].health - 98.5).abs() < 1e-4);
        assert_eq!(state.asteroids[2].health, 100.0);
    }

    #[test]
    fn test_destroy_drops_loot_and_events() {
        let (mut state, mut rng) = create_test_state();
        let mut asteroid = Asteroid::new(1, Vec2::new(50.0, 50.0), Vec2::ZERO, 12.0, 8.0, false, false);
        asteroid.health = 0.0;
        state.asteroids.push(asteroid);
        sweep_destroyed(&mut state, &mut rng);

        assert!(state.asteroids.is_empty());
        assert_eq!(state.floating_loot.len(), 3);
        assert!(state.floating_loot.iter().all(|l| l.material != Material::PowerCore));
        assert!(state.floating_loot.iter().all(|l| l.lifetime == loot::LIFETIME));

        let unique: std::collections::HashSet<_> = state.floating_loot.iter().map(|l| l.material).collect();
        let texts = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::FloatingText { .. }))
            .count();
        assert_eq!(texts, unique.len());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::AsteroidDestroyed { id: 1, .. })));
    }

    #[test]
    fn test_sweep_keeps_living() {
        let (mut state, mut rng) = create_test_state();
        state.asteroids.push(rock(1, 0.0, 1.0));
        sweep_destroyed(&mut state, &mut rng);
        assert_eq!(state.asteroids.len(), 1);
        assert!(state.events.is_empty());
    }
}
