use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DataError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed of the shared damage-roll stream
    pub seed: u64,
    /// Fixed ticks per second used by hosts that step at a constant rate
    pub tick_rate: u32,
    /// Living units allowed at once; corpses are not counted
    pub max_units: usize,
    pub arrive_epsilon: f32,
    pub flee_distance: f32,
    /// Fleeing ends once hp fraction exceeds this multiple of the threshold
    pub flee_recovery_factor: f32,
    pub flee_repath_interval: f32,
    /// Extra distance past acquisition range before an auto-acquired target is dropped
    pub target_leash: f32,
    /// Seconds a corpse stays in the registry after death
    pub corpse_grace_period: f32,
    pub hero_xp_range: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: 32,
            max_units: 512,
            arrive_epsilon: 4.0,
            flee_distance: 400.0,
            flee_recovery_factor: 2.0,
            flee_repath_interval: 0.5,
            target_leash: 300.0,
            corpse_grace_period: 8.0,
            hero_xp_range: 1200.0,
        }
    }
}

impl SimConfig {
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DataError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
