//! Quest pacing, travel tracking, and reward claims

use rand::Rng;

use crate::game::constants::quest::{COSMETIC_FALLBACK_REWARD, MAX_ACTIVE, SPAWN_COOLDOWN, TRAVEL_UNIT, XP_PER_LEVEL};
use crate::game::events::GameEvent;
use crate::game::quest::{Quest, QuestEvent, QuestReward};
use crate::game::state::WorldState;
use crate::game::systems::economy::ShopError;

/// Convert flown distance into travel units and spawn a quest when the board is short
pub fn update<R: Rng + ?Sized>(state: &mut WorldState, rng: &mut R, dt: f32) {
    if state.travel_accum >= TRAVEL_UNIT {
        let units = (state.travel_accum / TRAVEL_UNIT).floor();
        state.travel_accum -= units * TRAVEL_UNIT;
        state.record_quest(QuestEvent::Traveled(units as u32));
    }

    if state.quests.len() >= MAX_ACTIVE {
        state.quest_timer = 0.0;
        return;
    }
    state.quest_timer += dt;
    if state.quest_timer < SPAWN_COOLDOWN {
        return;
    }
    state.quest_timer = 0.0;

    let quest = Quest::random(rng);
    tracing::debug!(kind = ?quest.kind, target = quest.target, "Quest spawned");
    state.emit(GameEvent::QuestSpawned { kind: quest.kind });
    state.quests.push(quest);
}

/// Claim a completed quest: pay the reward, grant XP, and remove it.
///
/// Cosmetic rewards unlock the next locked style of their category and fall
/// back to currency once the category is exhausted.
pub fn claim(state: &mut WorldState, index: usize) -> Result<QuestReward, ShopError> {
    let quest = state.quests.get_mut(index).ok_or(ShopError::NoSuchQuest(index))?;
    if !quest.completed {
        return Err(ShopError::QuestIncomplete);
    }
    quest.claimed = true;
    let quest = state.quests.remove(index);

    let reward = match quest.reward {
        QuestReward::Currency { amount } => {
            state.add_currency(amount);
            quest.reward
        }
        QuestReward::Cosmetic { category } => match state.cosmetics.unlock_next(category) {
            Some(style) => {
                state.emit(GameEvent::CosmeticUnlocked {
                    style: style.to_string(),
                });
                quest.reward
            }
            None => {
                state.add_currency(COSMETIC_FALLBACK_REWARD);
                QuestReward::Currency {
                    amount: COSMETIC_FALLBACK_REWARD,
                }
            }
        },
    };

    let xp = quest.xp_reward();
    state.xp += xp;
    state.emit(GameEvent::QuestClaimed { kind: quest.kind, xp });
    while state.xp >= XP_PER_LEVEL * state.level {
        state.xp -= XP_PER_LEVEL * state.level;
        state.level += 1;
        state.emit(GameEvent::LevelUp { level: state.level });
    }
    Ok(reward)
}
