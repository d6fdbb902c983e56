//! In-memory input recording.
//!
//! A [`Replay`] holds the config a run started from plus every accepted
//! input and tick delta in order. Feeding it back into a fresh simulation
//! reproduces the run bit for bit, which [`Replay::verify`] checks against
//! the digest stamped when recording finished.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::combat::DamageMatrix;
use crate::engine::config::SimConfig;
use crate::engine::simulation::Simulation;
use crate::error::ReplayError;
use crate::stats::{DamageClass, StatsModel, TemplateId};
use crate::unit::{Command, PlayerId, UnitId};

/// An accepted external input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayInput {
    Spawn {
        template: TemplateId,
        owner: PlayerId,
        position: Vec2,
    },
    Command {
        unit: UnitId,
        command: Command,
    },
    Damage {
        unit: UnitId,
        amount: f32,
        damage_class: DamageClass,
        source: Option<UnitId>,
    },
    Heal {
        unit: UnitId,
        amount: f32,
    },
    Invest {
        unit: UnitId,
        slot: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    Input(ReplayInput),
    /// Scaled delta of one executed tick
    Tick(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub config: SimConfig,
    pub entries: Vec<ReplayEntry>,
    pub final_digest: Option<u64>,
}

impl Replay {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            final_digest: None,
        }
    }

    pub fn push_input(&mut self, input: ReplayInput) {
        self.entries.push(ReplayEntry::Input(input));
    }

    pub fn push_tick(&mut self, dt: f32) {
        self.entries.push(ReplayEntry::Tick(dt));
    }

    pub fn tick_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, ReplayEntry::Tick(_)))
            .count()
    }

    /// Re-run every entry on a fresh simulation
    pub fn play(
        &self,
        model: Arc<StatsModel>,
        matrix: Arc<DamageMatrix>,
    ) -> Result<Simulation, ReplayError> {
        let mut sim = Simulation::new(self.config.clone(), model, matrix);
        for entry in &self.entries {
            match entry {
                ReplayEntry::Tick(dt) => sim.tick(*dt),
                ReplayEntry::Input(input) => apply(&mut sim, input)?,
            }
        }
        Ok(sim)
    }

    /// Play and compare against the recorded final digest. Returns the
    /// reproduced digest.
    pub fn verify(
        &self,
        model: Arc<StatsModel>,
        matrix: Arc<DamageMatrix>,
    ) -> Result<u64, ReplayError> {
        let actual = self.play(model, matrix)?.state_digest();
        match self.final_digest {
            Some(expected) if expected != actual => {
                tracing::warn!(expected, actual, "replay diverged");
                Err(ReplayError::Diverged { expected, actual })
            }
            _ => Ok(actual),
        }
    }
}

fn apply(sim: &mut Simulation, input: &ReplayInput) -> Result<(), ReplayError> {
    match input {
        ReplayInput::Spawn {
            template,
            owner,
            position,
        } => {
            sim.spawn(template, *owner, *position)?;
        }
        ReplayInput::Command { unit, command } => sim.issue(*unit, command.clone())?,
        ReplayInput::Damage {
            unit,
            amount,
            damage_class,
            source,
        } => {
            sim.apply_damage(*unit, *amount, *damage_class, *source)?;
        }
        ReplayInput::Heal { unit, amount } => {
            sim.heal(*unit, *amount)?;
        }
        ReplayInput::Invest { unit, slot } => {
            sim.invest_ability(*unit, *slot)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> (Arc<StatsModel>, Arc<DamageMatrix>) {
        (
            Arc::new(StatsModel::builtin()),
            Arc::new(DamageMatrix::standard()),
        )
    }

    fn recorded_skirmish() -> Replay {
        let (model, matrix) = shared();
        let mut sim = Simulation::new(SimConfig::default(), model, matrix).with_recording();
        let a = sim.spawn("footman", PlayerId(1), Vec2::ZERO).unwrap();
        let b = sim.spawn("rifleman", PlayerId(2), Vec2::new(400.0, 0.0)).unwrap();
        for _ in 0..64 {
            sim.tick(1.0 / 32.0);
        }
        sim.issue(a, Command::Attack(b)).unwrap();
        sim.apply_damage(b, 25.0, DamageClass::Magic, None).unwrap();
        for _ in 0..160 {
            sim.tick(1.0 / 32.0);
        }
        sim.finish_recording().unwrap()
    }

    #[test]
    fn test_replay_reproduces_digest() {
        let replay = recorded_skirmish();
        assert_eq!(replay.tick_count(), 224);
        let (model, matrix) = shared();
        let digest = replay.verify(model, matrix).unwrap();
        assert_eq!(Some(digest), replay.final_digest);
    }

    #[test]
    fn test_tampered_replay_diverges() {
        let mut replay = recorded_skirmish();
        replay.entries.push(ReplayEntry::Tick(0.5));
        let (model, matrix) = shared();
        assert!(matches!(
            replay.verify(model, matrix),
            Err(ReplayError::Diverged { .. })
        ));
    }

    #[test]
    fn test_rejections_are_not_recorded() {
        let (model, matrix) = shared();
        let mut sim = Simulation::new(SimConfig::default(), model, matrix).with_recording();
        let a = sim.spawn("footman", PlayerId(1), Vec2::ZERO).unwrap();
        assert!(sim.issue(a, Command::Attack(a)).is_err());
        let replay = sim.finish_recording().unwrap();
        assert_eq!(replay.entries.len(), 1);
    }

    #[test]
    fn test_replay_json_roundtrip() {
        let replay = recorded_skirmish();
        let json = serde_json::to_string(&replay).unwrap();
        let back: Replay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, replay);
    }
}
