//! Superpower catalogue and the typed effect lookup
//!
//! A loadout stores which powers are owned, their levels, and the single
//! equipped power. Each tick the systems ask [`PowerLoadout::effect`] for the
//! parameters of the equipped power instead of scanning untyped tags.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::game::constants::bullet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    DamageOrbs,
    BulletSplit,
    AutoAim,
    UltraFire,
    Magnet,
    ExplosiveShots,
    PiercingShots,
}

/// Shop entry for a power
#[derive(Debug, Clone, Copy)]
pub struct PowerStats {
    pub name: &'static str,
    pub base_cost: f64,
    pub max_level: u32,
    pub upgrade_cost_mult: f64,
}

impl PowerKind {
    pub const ALL: [PowerKind; 7] = [
        PowerKind::DamageOrbs,
        PowerKind::BulletSplit,
        PowerKind::AutoAim,
        PowerKind::UltraFire,
        PowerKind::Magnet,
        PowerKind::ExplosiveShots,
        PowerKind::PiercingShots,
    ];

    pub fn stats(&self) -> PowerStats {
        let (name, base_cost, max_level, upgrade_cost_mult) = match self {
            PowerKind::DamageOrbs => ("Damage Orbs", 500.0, 5, 2.0),
            PowerKind::BulletSplit => ("Bullet Split", 600.0, 3, 2.5),
            PowerKind::AutoAim => ("Auto Aim", 800.0, 5, 2.0),
            PowerKind::UltraFire => ("Ultra Fire", 700.0, 5, 2.5),
            PowerKind::Magnet => ("Loot Magnet", 550.0, 4, 2.0),
            PowerKind::ExplosiveShots => ("Explosive Shots", 900.0, 4, 2.5),
            PowerKind::PiercingShots => ("Piercing Shots", 1000.0, 5, 3.0),
        };
        PowerStats {
            name,
            base_cost,
            max_level,
            upgrade_cost_mult,
        }
    }

    /// Cost to go from `level` to `level + 1`: `floor(base * mult^level)`
    pub fn upgrade_cost(&self, level: u32) -> f64 {
        let stats = self.stats();
        (stats.base_cost * stats.upgrade_cost_mult.powi(level as i32)).floor()
    }

    /// Derived parameters of this power at `level`
    pub fn effect_at(&self, level: u32) -> PowerEffect {
        let l = level as f32;
        match self {
            PowerKind::DamageOrbs => PowerEffect::DamageOrbs {
                count: 2 + level as usize,
                orbit_radius: 60.0 + 10.0 * l,
                damage_per_second: (1.0 + 0.5 * l) * 3.0,
            },
            PowerKind::BulletSplit => PowerEffect::BulletSplit {
                count: 1 + level as usize,
                speed: bullet::SPEED * 0.7,
                lifetime: bullet::LIFETIME * 0.5,
            },
            PowerKind::AutoAim => PowerEffect::AutoAim {
                strength: 0.3 + 0.15 * l,
            },
            PowerKind::UltraFire => PowerEffect::UltraFire {
                divisor: 2.0 + 1.5 * l,
            },
            PowerKind::Magnet => PowerEffect::Magnet {
                range: 150.0 + 50.0 * l,
                strength: 200.0 + 100.0 * l,
            },
            PowerKind::ExplosiveShots => PowerEffect::Explosive {
                radius: 50.0 + 20.0 * l,
                damage: 2.0 + l,
            },
            PowerKind::PiercingShots => PowerEffect::Piercing { budget: level },
        }
    }
}

/// Orbs orbit the ship at this angular speed (rad/s)
pub const ORB_ANGULAR_SPEED: f32 = 2.0;
/// Added to the asteroid radius for the orb hit test
pub const ORB_HIT_RADIUS: f32 = 8.0;
/// Auto-aim only tracks asteroids within this distance of the bullet
pub const AIM_TRACKING_RADIUS: f32 = 400.0;
/// Steering blend gain
pub const AIM_GAIN: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerEffect {
    DamageOrbs {
        count: usize,
        orbit_radius: f32,
        damage_per_second: f32,
    },
    BulletSplit {
        count: usize,
        speed: f32,
        lifetime: f32,
    },
    AutoAim {
        strength: f32,
    },
    UltraFire {
        divisor: f32,
    },
    Magnet {
        range: f32,
        strength: f32,
    },
    Explosive {
        radius: f32,
        damage: f32,
    },
    Piercing {
        budget: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerLoadout {
    pub owned: Vec<PowerKind>,
    pub equipped: Option<PowerKind>,
    pub levels: HashMap<PowerKind, u32>,
}

impl PowerLoadout {
    pub fn owns(&self, kind: PowerKind) -> bool {
        self.owned.contains(&kind)
    }

    pub fn level(&self, kind: PowerKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    /// Effect of the equipped power, if it is owned
    pub fn effect(&self) -> Option<PowerEffect> {
        let kind = self.equipped?;
        if !self.owns(kind) {
            return None;
        }
        Some(kind.effect_at(self.level(kind)))
    }

    pub fn magnet(&self) -> Option<(f32, f32)> {
        match self.effect()? {
            PowerEffect::Magnet { range, strength } => Some((range, strength)),
            _ => None,
        }
    }

    pub fn aim_strength(&self) -> Option<f32> {
        match self.effect()? {
            PowerEffect::AutoAim { strength } => Some(strength),
            _ => None,
        }
    }

    pub fn fire_divisor(&self) -> f32 {
        match self.effect() {
            Some(PowerEffect::UltraFire { divisor }) => divisor,
            _ => 1.0,
        }
    }

    pub fn pierce_budget(&self) -> u32 {
        match self.effect() {
            Some(PowerEffect::Piercing { budget }) => budget,
            _ => 0,
        }
    }

    /// Drop an equipped power that isn't owned and duplicate ownership entries
    pub fn repair(&mut self) {
        let mut seen = Vec::with_capacity(self.owned.len());
        self.owned.retain(|k| {
            if seen.contains(k) {
                false
            } else {
                seen.push(*k);
                true
            }
        });
        if let Some(kind) = self.equipped {
            if !self.owns(kind) {
                self.equipped = None;
            }
        }
        for kind in &self.owned {
            let max = kind.stats().max_level;
            let level = self.levels.entry(*kind).or_insert(1);
            *level = (*level).min(max);
        }
    }
}
