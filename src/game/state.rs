//! World state definitions
//!
//! Contains every entity (asteroids, bullets, cargo, floating loot, quests)
//! plus the camera/ship kinematics and progression owned by one player.

use hashbrown::HashMap;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::game::constants::{asteroid, bullet, cargo, loot, quest as quest_consts, ship, world};
use crate::game::cosmetics::Cosmetics;
use crate::game::events::GameEvent;
use crate::game::loot::Material;
use crate::game::powers::PowerLoadout;
use crate::game::quest::{Quest, QuestEvent};
use crate::util::vec2::Vec2;

/// Stable identifier for simulation entities
pub type EntityId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asteroid {
    /// Reassigned on load, so not authoritative in save files
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub radius: f32,
    pub boss: bool,
    pub golden: bool,
}

impl Default for Asteroid {
    fn default() -> Self {
        Self {
            id: 0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            health: asteroid::MIN_HEALTH as f32,
            max_health: asteroid::MIN_HEALTH as f32,
            radius: asteroid::BASE_RADIUS,
            boss: false,
            golden: false,
        }
    }
}

impl Asteroid {
    pub fn new(id: EntityId, position: Vec2, velocity: Vec2, health: f32, radius: f32, boss: bool, golden: bool) -> Self {
        Self {
            id,
            position,
            velocity,
            health,
            max_health: health,
            radius,
            boss,
            golden,
        }
    }

    /// Small starter asteroid for a new world
    pub fn starter<R: Rng + ?Sized>(rng: &mut R, id: EntityId) -> Self {
        let position = Vec2::new(
            rng.gen_range(0..=asteroid::INITIAL_AREA) as f32,
            rng.gen_range(0..=asteroid::INITIAL_AREA) as f32,
        );
        let velocity = Vec2::new(
            rng.gen_range(asteroid::INITIAL_SPEED_MIN..asteroid::INITIAL_SPEED_MAX),
            rng.gen_range(asteroid::INITIAL_SPEED_MIN..asteroid::INITIAL_SPEED_MAX),
        );
        let health = rng.gen_range(asteroid::MIN_HEALTH..=asteroid::MAX_HEALTH) as f32;
        let golden = rng.gen_bool(asteroid::GOLDEN_CHANCE);
        Self::new(id, position, velocity, health, asteroid::BASE_RADIUS, false, golden)
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Projectile fired by the ship or spawned by a split
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub lifetime: f32,
    /// Asteroids already passed through
    pub pierce_count: u32,
    /// Asteroid this bullet cannot hit (split fragments ignore their source)
    pub ignore: Option<EntityId>,
}

impl Bullet {
    pub fn new(id: EntityId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
            lifetime: bullet::LIFETIME,
            pierce_count: 0,
            ignore: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime <= 0.0
    }
}

/// Cargo hanging behind the ship on a tether
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarriedItem {
    #[serde(default, alias = "mat")]
    pub material: Material,
    /// Angle relative to heading; rest position is PI (straight behind)
    #[serde(default = "default_rel_angle")]
    pub rel_angle: f32,
    #[serde(default)]
    pub ang_vel: f32,
    #[serde(default = "default_tether")]
    pub length: f32,
    #[serde(default)]
    pub color: [u8; 3],
}

fn default_rel_angle() -> f32 {
    std::f32::consts::PI
}

fn default_tether() -> f32 {
    cargo::BASE_LENGTH
}

impl CarriedItem {
    /// Freshly picked item with a little swing
    pub fn picked_up<R: Rng + ?Sized>(rng: &mut R, material: Material) -> Self {
        Self {
            material,
            rel_angle: std::f32::consts::PI + rng.gen_range(-cargo::ANGLE_JITTER..cargo::ANGLE_JITTER),
            ang_vel: rng.gen_range(-cargo::ANG_VEL_JITTER..cargo::ANG_VEL_JITTER),
            length: cargo::BASE_LENGTH + rng.gen_range(cargo::LENGTH_MIN_OFFSET..cargo::LENGTH_MAX_OFFSET),
            color: material.color(),
        }
    }

    /// Offset from the ship in world space
    pub fn offset(&self, ship_rotation: f32) -> Vec2 {
        Vec2::heading(ship_rotation + self.rel_angle) * self.length
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingLoot {
    #[serde(default, alias = "mat")]
    pub material: Material,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default)]
    pub color: [u8; 3],
    /// Seconds left; negative means it never expires
    #[serde(default = "default_loot_lifetime")]
    pub lifetime: f32,
}

fn default_loot_lifetime() -> f32 {
    loot::LIFETIME
}

impl FloatingLoot {
    pub fn new(material: Material, position: Vec2, velocity: Vec2) -> Self {
        Self {
            material,
            position,
            velocity,
            color: material.color(),
            lifetime: loot::LIFETIME,
        }
    }

    /// Loot thrown out at `speed` in a random direction
    pub fn scattered<R: Rng + ?Sized>(rng: &mut R, material: Material, position: Vec2, speed_min: f32, speed_max: f32) -> Self {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let speed = rng.gen_range(speed_min..speed_max);
        Self::new(material, position, Vec2::from_angle(angle) * speed)
    }

    pub fn is_infinite(&self) -> bool {
        self.lifetime < 0.0
    }

    pub fn is_expired(&self) -> bool {
        !self.is_infinite() && self.lifetime <= 0.0
    }
}

/// Ship upgrade levels bought at the base
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub speed: u32,
    pub storage: u32,
    pub shot_damage: u32,
    pub shoot_speed: u32,
    /// One-way latch set when the drop-zone goal is met
    pub powers_unlocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    Speed,
    Storage,
    ShotDamage,
    ShootSpeed,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Speed,
        UpgradeKind::Storage,
        UpgradeKind::ShotDamage,
        UpgradeKind::ShootSpeed,
    ];

    /// `base * mult^level`
    pub fn cost(&self, level: u32) -> f64 {
        let (base, mult) = match self {
            UpgradeKind::Speed => (8.0, 2.5),
            UpgradeKind::Storage => (12.0, 2.8),
            UpgradeKind::ShotDamage => (20.0, 3.2),
            UpgradeKind::ShootSpeed => (15.0, 2.9),
        };
        base * f64::powi(mult, level as i32)
    }
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Speed => self.speed,
            UpgradeKind::Storage => self.storage,
            UpgradeKind::ShotDamage => self.shot_damage,
            UpgradeKind::ShootSpeed => self.shoot_speed,
        }
    }

    pub fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Speed => &mut self.speed,
            UpgradeKind::Storage => &mut self.storage,
            UpgradeKind::ShotDamage => &mut self.shot_damage,
            UpgradeKind::ShootSpeed => &mut self.shoot_speed,
        }
    }

    pub fn accel(&self) -> f32 {
        ship::BASE_ACCEL + ship::ACCEL_PER_LEVEL * self.speed as f32
    }

    pub fn max_speed(&self) -> f32 {
        ship::BASE_MAX_SPEED + ship::MAX_SPEED_PER_LEVEL * self.speed as f32
    }

    pub fn storage_capacity(&self) -> usize {
        cargo::BASE_CAPACITY + cargo::CAPACITY_PER_LEVEL * self.storage as usize
    }

    pub fn bullet_damage(&self) -> f32 {
        1.0 + self.shot_damage as f32
    }

    /// Cooldown before any power divisor
    pub fn base_fire_cooldown(&self) -> f32 {
        (bullet::BASE_COOLDOWN - bullet::COOLDOWN_PER_LEVEL * self.shoot_speed as f32).max(bullet::MIN_COOLDOWN)
    }
}

/// Materials needed in the drop zone to unlock powers
pub const POWER_UNLOCK_COST: [(Material, u32); 5] = [
    (Material::Iron, 10),
    (Material::Copper, 5),
    (Material::Titanium, 3),
    (Material::Uranium, 2),
    (Material::PowerCore, 1),
];

pub fn unlock_requirement(material: Material) -> Option<u32> {
    POWER_UNLOCK_COST
        .iter()
        .find(|(m, _)| *m == material)
        .map(|(_, qty)| *qty)
}

/// Read a saved list entry by entry, dropping entries that do not parse
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Dropping unreadable saved entry: {}", e);
                None
            }
        })
        .collect())
}

/// Complete single-player world: camera/ship, entities and progression.
///
/// Fields marked `serde(skip)` are per-session and rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldState {
    /// Ship position; the renderer keeps the ship centered
    pub camera: Vec2,
    pub camera_velocity: Vec2,
    pub rotation: f32,
    pub currency: f64,
    pub xp: u32,
    pub level: u32,
    pub upgrades: Upgrades,
    #[serde(deserialize_with = "lenient_list")]
    pub carried_items: Vec<CarriedItem>,
    #[serde(deserialize_with = "lenient_list")]
    pub floating_loot: Vec<FloatingLoot>,
    #[serde(deserialize_with = "lenient_list")]
    pub asteroids: Vec<Asteroid>,
    #[serde(deserialize_with = "lenient_list")]
    pub quests: Vec<Quest>,
    pub powers: PowerLoadout,
    pub cosmetics: Cosmetics,
    pub power_shop_materials: HashMap<Material, u32>,

    #[serde(skip)]
    pub bullets: Vec<Bullet>,
    #[serde(skip)]
    pub time_since_shot: f32,
    #[serde(skip)]
    pub spawn_timer: f32,
    #[serde(skip)]
    pub quest_timer: f32,
    #[serde(skip)]
    pub drop_cooldown: f32,
    /// Current orb angles for the damage-orb power
    #[serde(skip)]
    pub orb_angles: Vec<f32>,
    /// Distance flown toward the next travel-quest unit
    #[serde(skip)]
    pub travel_accum: f32,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip)]
    next_entity_id: EntityId,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            camera: Vec2::ZERO,
            camera_velocity: Vec2::ZERO,
            rotation: 0.0,
            currency: 0.0,
            xp: 0,
            level: 1,
            upgrades: Upgrades::default(),
            carried_items: Vec::new(),
            floating_loot: Vec::new(),
            asteroids: Vec::with_capacity(asteroid::MAX_COUNT),
            quests: Vec::with_capacity(quest_consts::MAX_ACTIVE),
            powers: PowerLoadout::default(),
            cosmetics: Cosmetics::default(),
            power_shop_materials: HashMap::new(),
            bullets: Vec::new(),
            time_since_shot: 0.0,
            spawn_timer: 0.0,
            quest_timer: 0.0,
            drop_cooldown: 0.0,
            orb_angles: Vec::new(),
            travel_accum: 0.0,
            events: Vec::new(),
            next_entity_id: 1,
        }
    }
}

impl WorldState {
    /// Fresh world: starter asteroids around the origin and three quests
    pub fn new_world<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut state = Self::default();
        for _ in 0..asteroid::INITIAL_COUNT {
            let id = state.next_entity_id();
            state.asteroids.push(Asteroid::starter(rng, id));
        }
        for _ in 0..quest_consts::MAX_ACTIVE {
            state.quests.push(Quest::random(rng));
        }
        state
    }

    /// Generate a new unique entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn storage_capacity(&self) -> usize {
        self.upgrades.storage_capacity()
    }

    pub fn storage_free(&self) -> usize {
        self.storage_capacity().saturating_sub(self.carried_items.len())
    }

    pub fn at_base(&self) -> bool {
        self.camera.distance_to(world::BASE) <= world::BASE_RADIUS
    }

    pub fn in_drop_zone(&self) -> bool {
        self.camera.distance_to(world::POWER_SHOP) <= world::POWER_SHOP_RADIUS
    }

    /// Effective fire cooldown including the ultra-fire divisor
    pub fn fire_cooldown(&self) -> f32 {
        self.upgrades.base_fire_cooldown() / self.powers.fire_divisor()
    }

    /// Credit or debit currency, kept to two decimals
    pub fn add_currency(&mut self, delta: f64) {
        self.currency = ((self.currency + delta) * 100.0).round() / 100.0;
        self.emit(GameEvent::CurrencyChanged {
            currency: self.currency,
            delta,
        });
    }

    /// Feed an event to every open quest
    pub fn record_quest(&mut self, event: QuestEvent) {
        let mut completed = Vec::new();
        for quest in self.quests.iter_mut() {
            let amount = quest.kind.progress_for(&event);
            if quest.advance(amount) {
                completed.push(quest.kind);
            }
        }
        for kind in completed {
            tracing::debug!(?kind, "Quest completed");
            self.emit(GameEvent::QuestCompleted { kind });
        }
    }

    /// Bring loaded data back inside its invariants
    pub fn normalize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.next_entity_id = 1;
        for i in 0..self.asteroids.len() {
            let id = self.next_entity_id();
            let a = &mut self.asteroids[i];
            a.id = id;
            a.radius = clamp_or(a.radius, 1.0, asteroid::MAX_RADIUS, asteroid::BASE_RADIUS);
            a.max_health = clamp_or(a.max_health, 1.0, asteroid::HEALTH_CAP, 1.0);
            a.health = clamp_or(a.health, 0.0, a.max_health, a.max_health);
        }
        for item in self.carried_items.iter_mut() {
            if item.color == [0, 0, 0] {
                item.color = item.material.color();
            }
        }
        for item in self.floating_loot.iter_mut() {
            if item.color == [0, 0, 0] {
                item.color = item.material.color();
            }
            if item.is_infinite() {
                item.lifetime = loot::INFINITE_LIFETIME;
            }
        }
        for quest in self.quests.iter_mut() {
            quest.repair();
        }
        self.quests.retain(|q| !q.claimed);
        if self.quests.is_empty() {
            tracing::warn!("Loaded world has no quests, generating a fresh set");
            for _ in 0..quest_consts::MAX_ACTIVE {
                self.quests.push(Quest::random(rng));
            }
        }
        self.level = self.level.max(1);
        if !self.currency.is_finite() {
            tracing::warn!("Loaded world has invalid currency, resetting to 0");
            self.currency = 0.0;
        }
        self.powers.repair();
        self.cosmetics.repair();
    }
}

/// Clamp into `[lo, hi]`, substituting `fallback` for NaN
fn clamp_or(value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(lo, hi)
    }
}
