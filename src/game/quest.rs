//! Quests: kinds, random generation and progress latches

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::quest::{CURRENCY_REWARD_CHANCE, XP_PER_TARGET};
use crate::game::cosmetics::CosmeticCategory;
use crate::game::loot::Material;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    #[default]
    DestroyAsteroids,
    DestroyBoss,
    DestroyGolden,
    CollectIron,
    CollectGold,
    CollectDiamond,
    CollectPowerCore,
    EarnCoins,
    SellItems,
    TravelDistance,
}

impl QuestKind {
    pub const ALL: [QuestKind; 10] = [
        QuestKind::DestroyAsteroids,
        QuestKind::DestroyBoss,
        QuestKind::DestroyGolden,
        QuestKind::CollectIron,
        QuestKind::CollectGold,
        QuestKind::CollectDiamond,
        QuestKind::CollectPowerCore,
        QuestKind::EarnCoins,
        QuestKind::SellItems,
        QuestKind::TravelDistance,
    ];

    /// Inclusive target range
    pub fn target_range(&self) -> (u32, u32) {
        match self {
            QuestKind::DestroyAsteroids => (5, 15),
            QuestKind::DestroyBoss => (1, 3),
            QuestKind::DestroyGolden => (2, 5),
            QuestKind::CollectIron => (10, 20),
            QuestKind::CollectGold => (5, 12),
            QuestKind::CollectDiamond => (2, 6),
            QuestKind::CollectPowerCore => (1, 2),
            QuestKind::EarnCoins => (50, 200),
            QuestKind::SellItems => (10, 30),
            QuestKind::TravelDistance => (20, 60),
        }
    }

    /// Currency paid per unit of target for currency-reward quests
    pub fn reward_per_unit(&self) -> f64 {
        match self {
            QuestKind::DestroyAsteroids => 5.0,
            QuestKind::DestroyBoss => 60.0,
            QuestKind::DestroyGolden => 25.0,
            QuestKind::CollectIron => 2.0,
            QuestKind::CollectGold => 6.0,
            QuestKind::CollectDiamond => 20.0,
            QuestKind::CollectPowerCore => 80.0,
            QuestKind::EarnCoins => 0.5,
            QuestKind::SellItems => 3.0,
            QuestKind::TravelDistance => 4.0,
        }
    }

    pub fn describe(&self, target: u32) -> String {
        match self {
            QuestKind::DestroyAsteroids => format!("Destroy {} asteroids", target),
            QuestKind::DestroyBoss => format!("Destroy {} boss asteroids", target),
            QuestKind::DestroyGolden => format!("Destroy {} golden asteroids", target),
            QuestKind::CollectIron => format!("Collect {} Iron", target),
            QuestKind::CollectGold => format!("Collect {} Gold", target),
            QuestKind::CollectDiamond => format!("Collect {} Diamond", target),
            QuestKind::CollectPowerCore => format!("Collect {} Power Core", target),
            QuestKind::EarnCoins => format!("Earn {} coins", target),
            QuestKind::SellItems => format!("Sell {} items", target),
            QuestKind::TravelDistance => format!("Travel {} units", target as u64 * 100),
        }
    }

    /// Progress this kind gains from a simulation event
    pub fn progress_for(&self, event: &QuestEvent) -> u32 {
        match (self, event) {
            (QuestKind::DestroyAsteroids, QuestEvent::AsteroidDestroyed { .. }) => 1,
            (QuestKind::DestroyBoss, QuestEvent::AsteroidDestroyed { boss: true, .. }) => 1,
            (QuestKind::DestroyGolden, QuestEvent::AsteroidDestroyed { golden: true, .. }) => 1,
            (QuestKind::CollectIron, QuestEvent::Collected(Material::Iron)) => 1,
            (QuestKind::CollectGold, QuestEvent::Collected(Material::Gold)) => 1,
            (QuestKind::CollectDiamond, QuestEvent::Collected(Material::Diamond)) => 1,
            (QuestKind::CollectPowerCore, QuestEvent::Collected(Material::PowerCore)) => 1,
            (QuestKind::EarnCoins, QuestEvent::CoinsEarned(amount)) => *amount,
            (QuestKind::SellItems, QuestEvent::ItemsSold(count)) => *count,
            (QuestKind::TravelDistance, QuestEvent::Traveled(units)) => *units,
            _ => 0,
        }
    }
}

/// Simulation happenings that can advance quests
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuestEvent {
    AsteroidDestroyed { boss: bool, golden: bool },
    Collected(Material),
    CoinsEarned(u32),
    ItemsSold(u32),
    Traveled(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestReward {
    Currency { amount: f64 },
    Cosmetic { category: CosmeticCategory },
}

impl Default for QuestReward {
    fn default() -> Self {
        QuestReward::Cosmetic {
            category: CosmeticCategory::Ship,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    #[serde(default, alias = "quest_type")]
    pub kind: QuestKind,
    /// Zero when missing; `repair` raises it to 1
    #[serde(default)]
    pub target: u32,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub claimed: bool,
    #[serde(default)]
    pub reward: QuestReward,
}

impl Quest {
    pub fn new(kind: QuestKind, target: u32, reward: QuestReward) -> Self {
        Self {
            kind,
            target: target.max(1),
            progress: 0,
            completed: false,
            claimed: false,
            reward,
        }
    }

    /// Weighted draw: 80% currency reward, otherwise a ship or fire cosmetic
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let kind = QuestKind::ALL[rng.gen_range(0..QuestKind::ALL.len())];
        let (lo, hi) = kind.target_range();
        let target = rng.gen_range(lo..=hi);
        let reward = if rng.gen_bool(CURRENCY_REWARD_CHANCE) {
            QuestReward::Currency {
                amount: target as f64 * kind.reward_per_unit(),
            }
        } else if rng.gen_bool(0.5) {
            QuestReward::Cosmetic {
                category: CosmeticCategory::Ship,
            }
        } else {
            QuestReward::Cosmetic {
                category: CosmeticCategory::Fire,
            }
        };
        Self::new(kind, target, reward)
    }

    pub fn description(&self) -> String {
        self.kind.describe(self.target)
    }

    pub fn xp_reward(&self) -> u32 {
        self.target * XP_PER_TARGET
    }

    /// Add progress, clamped to the target. Returns true on the tick it completes.
    pub fn advance(&mut self, amount: u32) -> bool {
        if self.completed || amount == 0 {
            return false;
        }
        self.progress = self.progress.saturating_add(amount).min(self.target);
        if self.progress == self.target {
            self.completed = true;
            return true;
        }
        false
    }

    /// Re-establish the progress/latch invariants on loaded data
    pub fn repair(&mut self) {
        self.target = self.target.max(1);
        if self.claimed {
            self.completed = true;
        }
        if self.completed {
            self.progress = self.target;
        } else {
            self.progress = self.progress.min(self.target);
            if self.progress == self.target {
                self.completed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_invariants(q: &Quest) {
        assert!(q.progress <= q.target);
        if q.completed {
            assert_eq!(q.progress, q.target);
        }
        if q.claimed {
            assert!(q.completed);
        }
    }

    #[test]
    fn test_random_quest_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let q = Quest::random(&mut rng);
            let (lo, hi) = q.kind.target_range();
            assert!(q.target >= lo && q.target <= hi);
            assert_eq!(q.progress, 0);
            assert_invariants(&q);
        }
    }

    #[test]
    fn test_reward_mix_mostly_currency() {
        let mut rng = StdRng::seed_from_u64(5);
        let currency = (0..1000)
            .filter(|_| matches!(Quest::random(&mut rng).reward, QuestReward::Currency { .. }))
            .count();
        assert!(currency > 700 && currency < 900);
    }

    #[test]
    fn test_advance_clamps_and_latches() {
        let mut q = Quest::new(QuestKind::EarnCoins, 50, QuestReward::default());
        assert!(!q.advance(30));
        assert_eq!(q.progress, 30);
        assert!(q.advance(100));
        assert_eq!(q.progress, 50);
        assert!(q.completed);
        assert!(!q.advance(5));
        assert_eq!(q.progress, 50);
        assert_invariants(&q);
    }

    #[test]
    fn test_progress_monotonic() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut q = Quest::new(QuestKind::DestroyAsteroids, 12, QuestReward::default());
        let mut last = 0;
        for _ in 0..40 {
            q.advance(rng.gen_range(0..3));
            assert!(q.progress >= last);
            last = q.progress;
            assert_invariants(&q);
        }
    }

    #[test]
    fn test_progress_matching() {
        let boss = QuestEvent::AsteroidDestroyed { boss: true, golden: false };
        assert_eq!(QuestKind::DestroyBoss.progress_for(&boss), 1);
        assert_eq!(QuestKind::DestroyAsteroids.progress_for(&boss), 1);
        assert_eq!(QuestKind::DestroyGolden.progress_for(&boss), 0);
        assert_eq!(QuestKind::CollectGold.progress_for(&QuestEvent::Collected(Material::Gold)), 1);
        assert_eq!(QuestKind::CollectGold.progress_for(&QuestEvent::Collected(Material::Iron)), 0);
        assert_eq!(QuestKind::EarnCoins.progress_for(&QuestEvent::CoinsEarned(17)), 17);
    }

    #[test]
    fn test_repair_fixes_latches() {
        let mut q = Quest::new(QuestKind::SellItems, 10, QuestReward::default());
        q.progress = 40;
        q.claimed = true;
        q.repair();
        assert_invariants(&q);
        assert_eq!(q.progress, 10);

        let mut q = Quest::new(QuestKind::SellItems, 10, QuestReward::default());
        q.progress = 4;
        q.completed = true;
        q.repair();
        assert_invariants(&q);
    }

    #[test]
    fn test_missing_fields_default() {
        let q: Quest = serde_json::from_str(r#"{"kind":"destroy_boss","target":2}"#).unwrap();
        assert_eq!(q.progress, 0);
        assert!(!q.completed && !q.claimed);
    }

    #[test]
    fn test_kind_and_target_default_when_missing() {
        let mut q: Quest = serde_json::from_str(r#"{"progress":2}"#).unwrap();
        assert_eq!(q.kind, QuestKind::DestroyAsteroids);
        q.repair();
        assert_eq!(q.target, 1);
        assert_invariants(&q);
    }

    #[test]
    fn test_reads_quest_type_key() {
        let q: Quest = serde_json::from_str(
            r#"{"quest_type":"collect_gold","target":7,"progress":3,"completed":false,"reward_type":"fire"}"#,
        )
        .unwrap();
        assert_eq!(q.kind, QuestKind::CollectGold);
        assert_eq!(q.target, 7);
        assert_eq!(q.progress, 3);
    }
}
