//! User-adjustable aura settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::CategoryToggles;

pub const MIN_RANGE: f64 = 1.0;
pub const MAX_RANGE: f64 = 6.0;
pub const DEFAULT_RANGE: f64 = 4.25;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("range {value} outside 1.0..=6.0")]
    RangeOutOfBounds { value: f64 },
}

/// How interactions are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Bone meal every reachable plant in one tick, without turning to face them.
    #[default]
    Fast,
    /// One plant per tick, facing it and only through clear line of sight.
    Legit,
}

/// How much of locate, equip and use is automated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationLevel {
    /// Only uses bone meal that is already in hand.
    #[default]
    RightClick,
    /// Selects bone meal from the hotbar.
    Hotbar,
    /// Pulls bone meal from anywhere in the main inventory.
    Inventory,
}

impl AutomationLevel {
    /// Exclusive upper bound of inventory slots searched for bone meal.
    #[must_use]
    pub const fn scope(self) -> usize {
        match self {
            Self::RightClick => 0,
            Self::Hotbar => 9,
            Self::Inventory => 36,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuraConfig {
    pub range: f64,
    pub mode: Mode,
    pub automation: AutomationLevel,
    pub categories: CategoryToggles,
}

impl Default for AuraConfig {
    fn default() -> Self {
        Self {
            range: DEFAULT_RANGE,
            mode: Mode::default(),
            automation: AutomationLevel::default(),
            categories: CategoryToggles::default(),
        }
    }
}

impl AuraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RANGE..=MAX_RANGE).contains(&self.range) {
            return Err(ConfigError::RangeOutOfBounds { value: self.range });
        }
        Ok(())
    }

    #[must_use]
    pub fn range_sq(&self) -> f64 {
        self.range * self.range
    }

    #[must_use]
    pub fn range_ceil(&self) -> i32 {
        self.range.ceil() as i32
    }
}
