//! Events emitted by a simulation tick for the presentation layer

use serde::Serialize;

use crate::game::loot::Material;
use crate::game::powers::PowerKind;
use crate::game::quest::QuestKind;
use crate::game::state::EntityId;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    AsteroidDestroyed {
        id: EntityId,
        position: Vec2,
        boss: bool,
        golden: bool,
    },
    LootDropped {
        material: Material,
        position: Vec2,
    },
    /// "+1 Iron" style popup at a world position
    FloatingText {
        text: String,
        position: Vec2,
        color: [u8; 3],
    },
    /// One coin flying to the wallet per sold item
    CoinAnimation {
        value: f64,
    },
    CurrencyChanged {
        currency: f64,
        delta: f64,
    },
    ItemCollected {
        material: Material,
    },
    ItemDropped {
        material: Material,
    },
    QuestSpawned {
        kind: QuestKind,
    },
    QuestCompleted {
        kind: QuestKind,
    },
    QuestClaimed {
        kind: QuestKind,
        xp: u32,
    },
    LevelUp {
        level: u32,
    },
    CosmeticUnlocked {
        style: String,
    },
    MaterialDeposited {
        material: Material,
    },
    PowersUnlocked,
    PowerPurchased {
        kind: PowerKind,
        level: u32,
    },
}
