//! Selling, upgrade and power purchases, manual drops, and the drop zone

use rand::Rng;

use crate::game::constants::{loot, world};
use crate::game::cosmetics::CosmeticCategory;
use crate::game::events::GameEvent;
use crate::game::loot::Material;
use crate::game::powers::PowerKind;
use crate::game::quest::QuestEvent;
use crate::game::state::{unlock_requirement, FloatingLoot, UpgradeKind, WorldState, POWER_UNLOCK_COST};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShopError {
    #[error("Not at the base")]
    NotAtBase,
    #[error("Not at the power shop")]
    NotAtPowerShop,
    #[error("Powers are still locked")]
    PowersLocked,
    #[error("Insufficient funds: need {cost:.2}, have {available:.2}")]
    InsufficientFunds { cost: f64, available: f64 },
    #[error("{0:?} is already owned")]
    AlreadyOwned(PowerKind),
    #[error("{0:?} is not owned")]
    NotOwned(PowerKind),
    #[error("{0:?} is at max level")]
    MaxLevel(PowerKind),
    #[error("Cargo hold is empty")]
    EmptyCargo,
    #[error("No carried item at index {0}")]
    NoSuchItem(usize),
    #[error("Quest {0} does not exist")]
    NoSuchQuest(usize),
    #[error("Quest is not completed")]
    QuestIncomplete,
    #[error("Cosmetic {style} ({category:?}) is locked")]
    CosmeticLocked { category: CosmeticCategory, style: String },
}

fn charge(state: &mut WorldState, cost: f64) -> Result<(), ShopError> {
    if state.currency < cost {
        return Err(ShopError::InsufficientFunds {
            cost,
            available: state.currency,
        });
    }
    state.add_currency(-cost);
    Ok(())
}

/// Sell the whole hold at the base. Returns the amount earned.
pub fn sell_cargo(state: &mut WorldState) -> Result<f64, ShopError> {
    if !state.at_base() {
        return Err(ShopError::NotAtBase);
    }
    if state.carried_items.is_empty() {
        return Err(ShopError::EmptyCargo);
    }

    let items = std::mem::take(&mut state.carried_items);
    let mut total = 0.0;
    for item in &items {
        let value = item.material.price();
        total += value;
        state.emit(GameEvent::CoinAnimation { value });
    }
    let earned = (total * 100.0).round() / 100.0;
    state.add_currency(earned);
    state.record_quest(QuestEvent::ItemsSold(items.len() as u32));
    state.record_quest(QuestEvent::CoinsEarned(earned.floor() as u32));
    tracing::debug!(items = items.len(), earned, "Cargo sold");
    Ok(earned)
}

/// Buy one level of a ship upgrade at the base. Returns the price paid.
pub fn buy_upgrade(state: &mut WorldState, kind: UpgradeKind) -> Result<f64, ShopError> {
    if !state.at_base() {
        return Err(ShopError::NotAtBase);
    }
    let cost = kind.cost(state.upgrades.level(kind));
    charge(state, cost)?;
    *state.upgrades.level_mut(kind) += 1;
    Ok(cost)
}

fn require_power_shop(state: &WorldState) -> Result<(), ShopError> {
    if !state.upgrades.powers_unlocked {
        return Err(ShopError::PowersLocked);
    }
    if !state.in_drop_zone() {
        return Err(ShopError::NotAtPowerShop);
    }
    Ok(())
}

/// Buy a power at level 1
pub fn buy_power(state: &mut WorldState, kind: PowerKind) -> Result<f64, ShopError> {
    require_power_shop(state)?;
    if state.powers.owns(kind) {
        return Err(ShopError::AlreadyOwned(kind));
    }
    let cost = kind.stats().base_cost;
    charge(state, cost)?;
    state.powers.owned.push(kind);
    state.powers.levels.insert(kind, 1);
    state.emit(GameEvent::PowerPurchased { kind, level: 1 });
    Ok(cost)
}

/// Raise an owned power one level
pub fn upgrade_power(state: &mut WorldState, kind: PowerKind) -> Result<f64, ShopError> {
    require_power_shop(state)?;
    if !state.powers.owns(kind) {
        return Err(ShopError::NotOwned(kind));
    }
    let level = state.powers.level(kind);
    if level >= kind.stats().max_level {
        return Err(ShopError::MaxLevel(kind));
    }
    let cost = kind.upgrade_cost(level);
    charge(state, cost)?;
    state.powers.levels.insert(kind, level + 1);
    state.emit(GameEvent::PowerPurchased { kind, level: level + 1 });
    Ok(cost)
}

/// Equip an owned power; `None` unequips
pub fn equip_power(state: &mut WorldState, kind: Option<PowerKind>) -> Result<(), ShopError> {
    if let Some(kind) = kind {
        if !state.powers.owns(kind) {
            return Err(ShopError::NotOwned(kind));
        }
    }
    state.powers.equipped = kind;
    Ok(())
}

pub fn equip_cosmetic(state: &mut WorldState, category: CosmeticCategory, style: &str) -> Result<(), ShopError> {
    if state.cosmetics.equip(category, style) {
        Ok(())
    } else {
        Err(ShopError::CosmeticLocked {
            category,
            style: style.to_string(),
        })
    }
}

/// Throw a carried item out of the hold; pickup pauses briefly
pub fn drop_item<R: Rng + ?Sized>(state: &mut WorldState, rng: &mut R, index: usize) -> Result<Material, ShopError> {
    if index >= state.carried_items.len() {
        return Err(ShopError::NoSuchItem(index));
    }
    let item = state.carried_items.remove(index);
    let mut thrown = FloatingLoot::scattered(
        rng,
        item.material,
        state.camera,
        loot::THROW_SPEED_MIN,
        loot::THROW_SPEED_MAX,
    );
    thrown.color = item.color;
    state.floating_loot.push(thrown);
    state.drop_cooldown = loot::DROP_COOLDOWN;
    state.emit(GameEvent::ItemDropped {
        material: item.material,
    });
    Ok(item.material)
}

fn has_all_materials(state: &WorldState) -> bool {
    POWER_UNLOCK_COST
        .iter()
        .all(|(m, qty)| state.power_shop_materials.get(m).copied().unwrap_or(0) >= *qty)
}

/// Deposit one material toward the unlock goal if it is still needed
fn deposit(state: &mut WorldState, material: Material) -> bool {
    let Some(required) = unlock_requirement(material) else {
        return false;
    };
    let stored = state.power_shop_materials.entry(material).or_insert(0);
    if *stored >= required {
        return false;
    }
    *stored += 1;
    state.emit(GameEvent::MaterialDeposited { material });
    true
}

/// Latch powers unlocked once every counter is met, resetting the counters
fn try_unlock(state: &mut WorldState) {
    if state.upgrades.powers_unlocked || !has_all_materials(state) {
        return;
    }
    for (material, _) in POWER_UNLOCK_COST {
        state.power_shop_materials.insert(material, 0);
    }
    state.upgrades.powers_unlocked = true;
    tracing::debug!("Powers unlocked");
    state.emit(GameEvent::PowersUnlocked);
}

/// Deposit every needed carried item while inside the drop zone
pub fn deposit_cargo(state: &mut WorldState) -> Result<usize, ShopError> {
    if !state.in_drop_zone() {
        return Err(ShopError::NotAtPowerShop);
    }
    if state.upgrades.powers_unlocked {
        return Ok(0);
    }
    let mut deposited = 0;
    let mut i = 0;
    while i < state.carried_items.len() {
        let material = state.carried_items[i].material;
        if deposit(state, material) {
            state.carried_items.remove(i);
            deposited += 1;
        } else {
            i += 1;
        }
    }
    try_unlock(state);
    Ok(deposited)
}

/// Floating loot that drifts into the drop zone counts toward the unlock goal
pub fn absorb_drop_zone_loot(state: &mut WorldState) {
    if state.upgrades.powers_unlocked {
        return;
    }
    let zone_sq = world::POWER_SHOP_RADIUS * world::POWER_SHOP_RADIUS;
    let mut i = 0;
    while i < state.floating_loot.len() {
        let (position, material) = (state.floating_loot[i].position, state.floating_loot[i].material);
        if position.distance_sq_to(world::POWER_SHOP) <= zone_sq && deposit(state, material) {
            state.floating_loot.remove(i);
        } else {
            i += 1;
        }
    }
    try_unlock(state);
}

/// Interact action: sell at the base, deposit in the drop zone.
/// Anywhere else it does nothing.
pub fn interact(state: &mut WorldState) -> Result<(), ShopError> {
    if state.at_base() {
        sell_cargo(state)?;
    } else if state.in_drop_zone() {
        deposit_cargo(state)?;
    }
    Ok(())
}
