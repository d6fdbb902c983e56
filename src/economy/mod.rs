//! Upkeep throttle and the per-player resource ledger.
//!
//! Upkeep scales gold income down as food usage grows. The step function is
//! pure; [`PlayerEconomy`] is the bookkeeping a production layer wraps
//! around it.

use serde::{Deserialize, Serialize};

use crate::constants::{HIGH_UPKEEP_MULT, LOW_UPKEEP_MAX_FOOD, LOW_UPKEEP_MULT, NO_UPKEEP_MAX_FOOD};
use crate::error::EconomyError;
use crate::stats::UnitTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpkeepTier {
    None,
    Low,
    High,
}

impl UpkeepTier {
    pub fn for_food(food_used: u32) -> Self {
        if food_used <= NO_UPKEEP_MAX_FOOD {
            Self::None
        } else if food_used <= LOW_UPKEEP_MAX_FOOD {
            Self::Low
        } else {
            Self::High
        }
    }

    pub fn multiplier(self) -> f32 {
        match self {
            Self::None => 1.0,
            Self::Low => LOW_UPKEEP_MULT,
            Self::High => HIGH_UPKEEP_MULT,
        }
    }
}

/// Income multiplier for a food count: 1.0 up to 50, 0.7 up to 80, 0.4 above
pub fn upkeep_multiplier(food_used: u32) -> f32 {
    UpkeepTier::for_food(food_used).multiplier()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEconomy {
    pub gold: u32,
    pub lumber: u32,
    pub food_used: u32,
    pub food_cap: u32,
}

impl Default for PlayerEconomy {
    fn default() -> Self {
        Self {
            gold: 500,
            lumber: 150,
            food_used: 0,
            food_cap: 100,
        }
    }
}

impl PlayerEconomy {
    pub fn upkeep(&self) -> UpkeepTier {
        UpkeepTier::for_food(self.food_used)
    }

    /// Pay for and reserve food for one unit. Nothing changes on error.
    pub fn try_train(&mut self, template: &UnitTemplate) -> Result<(), EconomyError> {
        if self.gold < template.gold_cost || self.lumber < template.lumber_cost {
            tracing::debug!(template = %template.id, gold = self.gold, lumber = self.lumber, "cannot afford");
            return Err(EconomyError::InsufficientResources {
                gold: template.gold_cost,
                lumber: template.lumber_cost,
            });
        }
        if self.food_used + template.food_cost > self.food_cap {
            return Err(EconomyError::InsufficientFood {
                used: self.food_used,
                cost: template.food_cost,
                cap: self.food_cap,
            });
        }
        self.gold -= template.gold_cost;
        self.lumber -= template.lumber_cost;
        self.food_used += template.food_cost;
        Ok(())
    }

    /// Free the food of a dead or dismissed unit
    pub fn release_food(&mut self, template: &UnitTemplate) {
        self.food_used = self.food_used.saturating_sub(template.food_cost);
    }

    /// Gold actually received from `base` after upkeep, rounded
    pub fn income(&self, base: u32) -> u32 {
        (base as f32 * upkeep_multiplier(self.food_used)).round() as u32
    }

    /// Bank a harvest trip. Upkeep applies to gold only.
    pub fn deposit(&mut self, gold: u32, lumber: u32) -> u32 {
        let received = self.income(gold);
        self.gold = self.gold.saturating_add(received);
        self.lumber = self.lumber.saturating_add(lumber);
        received
    }
}
