//! Error taxonomy for the skirmish core.
//!
//! Every error here is recoverable: the caller gets a structured reason and
//! the simulation keeps its prior state. Nothing in the tick path returns
//! these; they surface only at the command, spawn and data-loading edges.

use crate::stats::TemplateId;
use crate::unit::UnitId;

/// Why a command was refused at the command boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandRejection {
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("unit {0} is dead")]
    UnitDead(UnitId),
    #[error("invalid target: {0}")]
    InvalidTarget(TargetRejection),
    #[error("patrol needs at least 2 waypoints, got {0}")]
    PatrolTooShort(usize),
    #[error("unit {0} is not a hero")]
    NotAHero(UnitId),
    #[error(transparent)]
    InvalidAbilityInvestment(#[from] InvalidAbilityInvestment),
}

/// Reason code attached to [`CommandRejection::InvalidTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TargetRejection {
    #[error("target {0} does not exist")]
    Missing(UnitId),
    #[error("target {0} is already dead")]
    Dead(UnitId),
    #[error("target {0} is an ally")]
    Ally(UnitId),
    #[error("a unit cannot target itself")]
    SelfTarget,
}

/// Ability investment refused by the unlock gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAbilityInvestment {
    #[error("no ability in slot {0}")]
    NoSuchSlot(usize),
    #[error("no unspent skill points")]
    NoSkillPoints,
    #[error("level {target} exceeds unlock tier {tier} at hero level {hero_level}")]
    ExceedsUnlockTier {
        target: u32,
        tier: u32,
        hero_level: u32,
    },
    #[error("level {target} exceeds ability max level {max}")]
    ExceedsMaxLevel { target: u32, max: u32 },
}

/// Spawn request refused by the world registry. Capacity counts living
/// units only; corpses awaiting removal do not block a spawn.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(TemplateId),
    #[error("unit capacity of {0} reached")]
    CapacityExceeded(usize),
}

/// Economy-layer refusals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    #[error("insufficient resources: need {gold} gold and {lumber} lumber")]
    InsufficientResources { gold: u32, lumber: u32 },
    #[error("insufficient food: {used} + {cost} exceeds cap {cap}")]
    InsufficientFood { used: u32, cost: u32, cap: u32 },
}

/// Failures while loading or validating definition data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("matrix cell {damage:?}/{armor:?} = {value} outside [0, 2]")]
    MultiplierOutOfRange {
        damage: crate::stats::DamageClass,
        armor: crate::stats::ArmorClass,
        value: f32,
    },
    #[error("template '{id}' is invalid: {reason}")]
    InvalidTemplate { id: TemplateId, reason: String },
    #[error("duplicate template id '{0}'")]
    DuplicateTemplate(TemplateId),
}

/// A balance duel that could not be set up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DuelError {
    #[error("duel spawn failed: {0}")]
    Spawn(#[from] SpawnError),
    #[error("duel order rejected: {0}")]
    Rejected(#[from] CommandRejection),
}

/// A recorded run that could not be reproduced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplayError {
    #[error("replayed spawn failed: {0}")]
    Spawn(#[from] SpawnError),
    #[error("replayed input rejected: {0}")]
    Rejected(#[from] CommandRejection),
    #[error("replay diverged: expected digest {expected:016x}, got {actual:016x}")]
    Diverged { expected: u64, actual: u64 },
}
