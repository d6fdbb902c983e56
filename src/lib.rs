//! Skirmish Core - deterministic RTS combat simulation
//!
//! This crate provides the unit-level rules of a real-time strategy
//! skirmish:
//! - Damage resolution (damage class x armor class matrix, armor reduction)
//! - Unit state machine (acquire, chase, swing, patrol, flee, die)
//! - Unit and hero templates loaded from RON
//! - Hero progression (XP curve, attribute growth, ability unlock gating)
//! - Upkeep throttle and player resource ledger
//! - Seeded simulation loop with state digests and input replay
//! - Monte-Carlo duel balance runs
//! - bevy plugin for hosting the simulation in an `App`

pub mod balance;
pub mod combat;
pub mod constants;
pub mod economy;
pub mod engine;
pub mod error;
pub mod logging;
pub mod progression;
pub mod stats;
pub mod unit;

pub use combat::{AttackProfile, DamageMatrix, DamageOutcome, DamageResolver, DefenseProfile};
pub use economy::{upkeep_multiplier, PlayerEconomy};
pub use engine::{SimConfig, SimEvent, Simulation, SimulationPlugin};
pub use error::{
    CommandRejection, DataError, DuelError, EconomyError, InvalidAbilityInvestment, ReplayError,
    SpawnError, TargetRejection,
};
pub use stats::{ArmorClass, DamageClass, StatsModel, UnitTemplate};
pub use unit::{Command, PlayerId, UnitId, UnitState};
