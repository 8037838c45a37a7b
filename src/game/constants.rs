/// Simulation clock constants
pub mod sim {
    /// Frame rate the simulation is tuned for
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
    /// Tick duration in milliseconds
    pub const TICK_DURATION_MS: u64 = 1000 / TICK_RATE as u64;
}

/// Ship (camera) kinematics
pub mod ship {
    use std::f32::consts::PI;

    /// Turn rate: 180 degrees per second
    pub const ROT_SPEED: f32 = PI;
    /// Base forward acceleration
    pub const BASE_ACCEL: f32 = 1200.0;
    /// Extra acceleration per speed upgrade level
    pub const ACCEL_PER_LEVEL: f32 = 40.0;
    /// Base per-axis velocity clamp
    pub const BASE_MAX_SPEED: f32 = 800.0;
    /// Extra velocity clamp per speed upgrade level
    pub const MAX_SPEED_PER_LEVEL: f32 = 20.0;
    /// Exponential friction coefficient: v -= v * min(1, FRICTION * dt)
    pub const FRICTION: f32 = 6.0;
    /// Thrust intent must exceed this to accelerate
    pub const THRUST_DEADZONE: f32 = 0.2;
    /// Collision radius of the ship
    pub const RADIUS: f32 = 14.0;
    /// Positional separation multiplier applied after a ship/asteroid hit
    pub const SEPARATION_FACTOR: f32 = 1.2;
}

/// Asteroid population and spawn curve
pub mod asteroid {
    /// Asteroids farther than this from the camera are despawned
    pub const DESPAWN_RADIUS: f32 = 1200.0;
    /// Seconds between spawn attempts
    pub const SPAWN_INTERVAL: f32 = 0.18;
    /// Population cap
    pub const MAX_COUNT: usize = 28;
    /// Extra spawn distance beyond half the viewport (inclusive range)
    pub const SPAWN_MARGIN_MIN: i32 = 100;
    pub const SPAWN_MARGIN_MAX: i32 = 300;
    /// Spawn probability decay length from the base anchor
    pub const SPAWN_DECAY: f32 = 4500.0;
    pub const SPAWN_CHANCE_FLOOR: f32 = 0.15;
    /// Beyond this distance the spawn chance is boosted
    pub const FAR_DISTANCE: f32 = 3000.0;
    pub const FAR_BOOST: f32 = 1.5;
    pub const FAR_CHANCE_CAP: f32 = 0.95;
    /// Distance per +1x size/health scale
    pub const SCALE_DISTANCE: f32 = 2000.0;
    pub const MAX_SCALE: f32 = 10.0;
    /// Boss probability: min(BOSS_PROB_CAP, BOSS_PROB_BASE + d / BOSS_PROB_DISTANCE)
    pub const BOSS_PROB_BASE: f32 = 0.02;
    pub const BOSS_PROB_DISTANCE: f32 = 20_000.0;
    pub const BOSS_PROB_CAP: f32 = 0.15;
    /// Bosses only spawn beyond this distance from base
    pub const BOSS_MIN_DISTANCE: f32 = 2000.0;
    pub const BOSS_BASE_HEALTH: f32 = 40.0;
    pub const BOSS_BASE_RADIUS: f32 = 32.0;
    pub const BOSS_RADIUS_DISTANCE: f32 = 200.0;
    /// Normal asteroids roll integer base health in this range
    pub const MIN_HEALTH: i32 = 6;
    pub const MAX_HEALTH: i32 = 18;
    pub const BASE_RADIUS: f32 = 8.0;
    pub const RADIUS_DISTANCE: f32 = 400.0;
    pub const MIN_RADIUS: f32 = 8.0;
    pub const MAX_RADIUS: f32 = 80.0;
    /// Loaded asteroids are clamped to this health
    pub const HEALTH_CAP: f32 = 1000.0;
    /// Spawned asteroids drift with each axis in [-DRIFT, DRIFT]
    pub const DRIFT: f32 = 30.0;
    pub const GOLDEN_CHANCE: f64 = 0.08;
    /// A fresh world starts with this many asteroids
    pub const INITIAL_COUNT: usize = 10;
    pub const INITIAL_AREA: i32 = 1000;
    pub const INITIAL_SPEED_MIN: f32 = 5.0;
    pub const INITIAL_SPEED_MAX: f32 = 30.0;
}

/// Bullets and fire rate
pub mod bullet {
    pub const SPEED: f32 = 900.0;
    pub const LIFETIME: f32 = 2.0;
    /// Bullets leave the ship this far ahead of its center
    pub const NOSE_OFFSET: f32 = 18.0;
    /// Added to the asteroid radius for the hit test
    pub const HIT_RADIUS: f32 = 6.0;
    pub const BASE_COOLDOWN: f32 = 0.8;
    pub const COOLDOWN_PER_LEVEL: f32 = 0.08;
    pub const MIN_COOLDOWN: f32 = 0.08;
}

/// Floating loot
pub mod loot {
    /// Velocity multiplier per tick
    pub const FRICTION: f32 = 0.95;
    pub const LIFETIME: f32 = 15.0;
    /// Lifetime sentinel for loot that never expires
    pub const INFINITE_LIFETIME: f32 = -1.0;
    pub const PICKUP_RADIUS: f32 = 30.0;
    pub const DROP_SPEED_MIN: f32 = 40.0;
    pub const DROP_SPEED_MAX: f32 = 80.0;
    /// Manual drop throw speed
    pub const THROW_SPEED_MIN: f32 = 100.0;
    pub const THROW_SPEED_MAX: f32 = 150.0;
    /// Pickup is disabled for this long after a manual drop
    pub const DROP_COOLDOWN: f32 = 1.0;
    /// Chance of a bonus Power Core from a golden asteroid
    pub const GOLDEN_CORE_CHANCE: f64 = 0.3;
    /// Rarity bias denominator: bias = min(1, (max_health + radius) / RARITY_DIVISOR)
    pub const RARITY_DIVISOR: f32 = 120.0;
    pub const RARITY_WEIGHT: f32 = 2.5;
    /// The last N table entries receive the rarity bias
    pub const RARE_ENTRIES: usize = 3;
    /// Upper bound on drops from a single asteroid
    pub const MAX_DROPS: usize = 128;
}

/// Carried cargo pendulum
pub mod cargo {
    pub const SPRING: f32 = 6.0;
    pub const DAMPING: f32 = 2.0;
    /// Lateral velocity coupling into the pendulum
    pub const COUPLING: f32 = 0.09;
    pub const ITEM_RADIUS: f32 = 8.0;
    pub const PUSH: f32 = 0.15;
    pub const BASE_CAPACITY: usize = 5;
    pub const CAPACITY_PER_LEVEL: usize = 5;
    pub const ANGLE_JITTER: f32 = 0.8;
    pub const ANG_VEL_JITTER: f32 = 1.0;
    pub const BASE_LENGTH: f32 = 55.0;
    pub const LENGTH_MIN_OFFSET: f32 = -10.0;
    pub const LENGTH_MAX_OFFSET: f32 = 15.0;
}

/// World landmarks
pub mod world {
    use crate::util::vec2::Vec2;

    /// Base anchor (sell point and upgrade shop)
    pub const BASE: Vec2 = Vec2::new(200.0, 200.0);
    pub const BASE_RADIUS: f32 = 120.0;
    /// Power shop, doubling as the drop zone
    pub const POWER_SHOP: Vec2 = Vec2::new(400.0, 200.0);
    pub const POWER_SHOP_RADIUS: f32 = 100.0;
}

/// Quest pacing and rewards
pub mod quest {
    pub const MAX_ACTIVE: usize = 3;
    /// Seconds between quest spawns while below MAX_ACTIVE
    pub const SPAWN_COOLDOWN: f32 = 120.0;
    /// Probability a new quest pays currency instead of a cosmetic
    pub const CURRENCY_REWARD_CHANCE: f64 = 0.8;
    pub const XP_PER_TARGET: u32 = 10;
    pub const XP_PER_LEVEL: u32 = 100;
    /// Paid instead of a cosmetic when the category is fully unlocked
    pub const COSMETIC_FALLBACK_REWARD: f64 = 250.0;
    /// Travel quests count units of this many world units
    pub const TRAVEL_UNIT: f32 = 100.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_margins_ordered() {
        assert!(asteroid::SPAWN_MARGIN_MIN < asteroid::SPAWN_MARGIN_MAX);
        assert!(asteroid::MIN_RADIUS < asteroid::MAX_RADIUS);
        assert!(asteroid::MIN_HEALTH < asteroid::MAX_HEALTH);
    }

    #[test]
    fn test_drop_zone_separate_from_base() {
        let gap = world::BASE.distance_to(world::POWER_SHOP);
        assert!(gap > 0.0);
    }

    #[test]
    fn test_tick_duration() {
        assert_eq!(sim::TICK_DURATION_MS, 16);
        assert!((sim::DT * sim::TICK_RATE as f32 - 1.0).abs() < 1e-6);
    }
}
