//! Materials, sell prices and asteroid loot tables

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::constants::loot::{GOLDEN_CORE_CHANCE, MAX_DROPS, RARE_ENTRIES, RARITY_DIVISOR, RARITY_WEIGHT};

/// Minable material. Serialized with its display name (`"Power Core"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Iron,
    Copper,
    Gold,
    Titanium,
    Platinum,
    Uranium,
    Diamond,
    #[serde(rename = "Power Core")]
    PowerCore,
}

impl Material {
    pub const ALL: [Material; 8] = [
        Material::Iron,
        Material::Copper,
        Material::Gold,
        Material::Titanium,
        Material::Platinum,
        Material::Uranium,
        Material::Diamond,
        Material::PowerCore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Material::Iron => "Iron",
            Material::Copper => "Copper",
            Material::Gold => "Gold",
            Material::Titanium => "Titanium",
            Material::Platinum => "Platinum",
            Material::Uranium => "Uranium",
            Material::Diamond => "Diamond",
            Material::PowerCore => "Power Core",
        }
    }

    /// Sell price at the base
    pub fn price(&self) -> f64 {
        match self {
            Material::Iron => 1.0,
            Material::Copper => 2.0,
            Material::Gold => 4.0,
            Material::Titanium => 6.0,
            Material::Platinum => 8.0,
            Material::Uranium => 10.0,
            Material::Diamond => 14.0,
            Material::PowerCore => 0.0,
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            Material::Iron => [150, 150, 150],
            Material::Copper => [184, 115, 51],
            Material::Gold => [212, 175, 55],
            Material::Titanium => [180, 180, 220],
            Material::Platinum => [200, 200, 255],
            Material::Uranium => [80, 255, 80],
            Material::Diamond => [180, 255, 255],
            Material::PowerCore => [100, 255, 100],
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Weighted table for ordinary asteroids, common first
pub const STANDARD_TABLE: [(Material, f32); 7] = [
    (Material::Iron, 0.50),
    (Material::Copper, 0.20),
    (Material::Gold, 0.08),
    (Material::Titanium, 0.08),
    (Material::Platinum, 0.06),
    (Material::Uranium, 0.05),
    (Material::Diamond, 0.03),
];

/// Weighted table for boss asteroids
pub const BOSS_TABLE: [(Material, f32); 7] = [
    (Material::Diamond, 0.25),
    (Material::Uranium, 0.20),
    (Material::Platinum, 0.20),
    (Material::Titanium, 0.15),
    (Material::Gold, 0.10),
    (Material::Copper, 0.06),
    (Material::Iron, 0.04),
];

pub type WeightedTable = SmallVec<[(Material, f32); 8]>;

/// Number of drops for an asteroid: `max(1, floor(max_health/6 + radius/8))`,
/// capped at `MAX_DROPS`
pub fn loot_count(max_health: f32, radius: f32) -> usize {
    let raw = (max_health / 6.0 + radius / 8.0).floor();
    if !raw.is_finite() || raw <= 1.0 {
        1
    } else if raw >= MAX_DROPS as f32 {
        MAX_DROPS
    } else {
        raw as usize
    }
}

/// Table with the last entries boosted by asteroid size, renormalised to 1.0
pub fn biased_table(boss: bool, max_health: f32, radius: f32) -> WeightedTable {
    let base: &[(Material, f32)] = if boss { &BOSS_TABLE } else { &STANDARD_TABLE };
    let bias = ((max_health + radius) / RARITY_DIVISOR).min(1.0);
    let rare_from = base.len().saturating_sub(RARE_ENTRIES);

    let mut table: WeightedTable = base
        .iter()
        .enumerate()
        .map(|(idx, &(mat, p))| {
            if idx >= rare_from {
                (mat, p + p * bias * RARITY_WEIGHT)
            } else {
                (mat, p)
            }
        })
        .collect();

    let total: f32 = table.iter().map(|(_, p)| p).sum();
    if total > 0.0 {
        for entry in table.iter_mut() {
            entry.1 /= total;
        }
    }
    table
}

/// Cumulative draw; falls back to the last entry on rounding shortfall
pub fn draw<R: Rng + ?Sized>(rng: &mut R, table: &[(Material, f32)]) -> Material {
    let r: f32 = rng.gen();
    let mut acc = 0.0;
    for &(mat, p) in table {
        acc += p;
        if r <= acc {
            return mat;
        }
    }
    table.last().map(|(m, _)| *m).unwrap_or(Material::Iron)
}

/// Every material dropped by a destroyed asteroid, in drop order
pub fn roll_drops<R: Rng + ?Sized>(
    rng: &mut R,
    boss: bool,
    golden: bool,
    max_health: f32,
    radius: f32,
) -> SmallVec<[Material; 16]> {
    let table = biased_table(boss, max_health, radius);
    let mut drops: SmallVec<[Material; 16]> = (0..loot_count(max_health, radius))
        .map(|_| draw(rng, &table))
        .collect();

    if golden && rng.gen_bool(GOLDEN_CORE_CHANCE) {
        drops.push(Material::PowerCore);
    }
    drops
}
