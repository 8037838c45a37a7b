use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmeticCategory {
    Ship,
    Fire,
}

/// Unlock order per category; the first entry is always unlocked
pub const SHIP_STYLES: [&str; 5] = ["default", "arrow", "wide", "needle", "delta"];
pub const FIRE_STYLES: [&str; 5] = ["default", "blue", "green", "purple", "rainbow"];

impl CosmeticCategory {
    pub fn styles(&self) -> &'static [&'static str] {
        match self {
            CosmeticCategory::Ship => &SHIP_STYLES,
            CosmeticCategory::Fire => &FIRE_STYLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cosmetics {
    pub unlocked_ships: Vec<String>,
    pub unlocked_fires: Vec<String>,
    pub equipped_ship: String,
    pub equipped_fire: String,
}

impl Default for Cosmetics {
    fn default() -> Self {
        Self {
            unlocked_ships: vec!["default".to_string()],
            unlocked_fires: vec!["default".to_string()],
            equipped_ship: "default".to_string(),
            equipped_fire: "default".to_string(),
        }
    }
}

impl Cosmetics {
    fn unlocked(&self, category: CosmeticCategory) -> &Vec<String> {
        match category {
            CosmeticCategory::Ship => &self.unlocked_ships,
            CosmeticCategory::Fire => &self.unlocked_fires,
        }
    }

    fn unlocked_mut(&mut self, category: CosmeticCategory) -> &mut Vec<String> {
        match category {
            CosmeticCategory::Ship => &mut self.unlocked_ships,
            CosmeticCategory::Fire => &mut self.unlocked_fires,
        }
    }

    pub fn is_unlocked(&self, category: CosmeticCategory, style: &str) -> bool {
        self.unlocked(category).iter().any(|s| s == style)
    }

    /// Unlock the next locked style of a category, returning its name
    pub fn unlock_next(&mut self, category: CosmeticCategory) -> Option<&'static str> {
        let next = category
            .styles()
            .iter()
            .copied()
            .find(|style| !self.is_unlocked(category, style))?;
        self.unlocked_mut(category).push(next.to_string());
        Some(next)
    }

    /// Equip an unlocked style; returns false if it is still locked
    pub fn equip(&mut self, category: CosmeticCategory, style: &str) -> bool {
        if !self.is_unlocked(category, style) {
            return false;
        }
        match category {
            CosmeticCategory::Ship => self.equipped_ship = style.to_string(),
            CosmeticCategory::Fire => self.equipped_fire = style.to_string(),
        }
        true
    }

    /// Ensure the defaults stay unlocked and equipped styles are unlocked
    pub fn repair(&mut self) {
        for category in [CosmeticCategory::Ship, CosmeticCategory::Fire] {
            let unlocked = self.unlocked_mut(category);
            unlocked.retain(|s| category.styles().contains(&s.as_str()));
            if !unlocked.iter().any(|s| s == "default") {
                unlocked.insert(0, "default".to_string());
            }
        }
        if !self.is_unlocked(CosmeticCategory::Ship, &self.equipped_ship) {
            self.equipped_ship = "default".to_string();
        }
        if !self.is_unlocked(CosmeticCategory::Fire, &self.equipped_fire) {
            self.equipped_fire = "default".to_string();
        }
    }
}
