//! Centralized game constants for the skirmish core.
//!
//! Formula coefficients shared by the resolver, progression and economy
//! modules. Tunable simulation knobs (flee distance, leash, grace periods)
//! live in [`crate::engine::SimConfig`] instead.

// =====================================================
// Combat
// =====================================================

/// Armor reduction factor per point: reduction = (a * F) / (1 + a * F)
pub const ARMOR_REDUCTION_FACTOR: f32 = 0.06;

/// Armor value where the reduction formula has its pole. Valid armor must
/// stay strictly above it.
pub const MIN_ARMOR: f32 = -1.0 / ARMOR_REDUCTION_FACTOR;

/// Upper bound for any damage/armor matrix cell
pub const MAX_TYPE_MULTIPLIER: f32 = 2.0;

/// Multiplier used when a matrix cell is missing
pub const UNKNOWN_COMBINATION_MULTIPLIER: f32 = 1.0;

// =====================================================
// Hero progression
// =====================================================

/// Highest hero level
pub const MAX_HERO_LEVEL: u32 = 10;

/// XP curve scale: xp_for_level(L) = XP_CURVE_SCALE * (L - 1)^2
pub const XP_CURVE_SCALE: u32 = 100;

/// Maximum number of ability slots on a hero
pub const MAX_HERO_ABILITIES: usize = 4;

/// Hero levels at which a standard ability gains one more usable level
pub const STANDARD_UNLOCK_LEVELS: [u32; 3] = [1, 3, 5];

/// Hero level at which the ultimate ability unlocks
pub const ULTIMATE_UNLOCK_LEVEL: u32 = 6;

/// Max HP gained per point of strength
pub const HP_PER_STRENGTH: f32 = 25.0;

/// Max mana gained per point of intelligence
pub const MANA_PER_INTELLIGENCE: f32 = 15.0;

/// Flat melee damage per point of strength (melee heroes)
pub const MELEE_DAMAGE_PER_STRENGTH: f32 = 1.0;

/// Flat ranged damage per point of agility (ranged heroes)
pub const RANGED_DAMAGE_PER_AGILITY: f32 = 1.0;

/// Attack speed bonus per point of agility (0.02 = +2%)
pub const ATTACK_SPEED_PER_AGILITY: f32 = 0.02;

/// Armor gained per point of agility
pub const ARMOR_PER_AGILITY: f32 = 0.3;

/// Spell damage bonus per point of intelligence (0.01 = +1%)
pub const SPELL_DAMAGE_PER_INTELLIGENCE: f32 = 0.01;

// =====================================================
// Economy
// =====================================================

/// Highest food count that still earns full income
pub const NO_UPKEEP_MAX_FOOD: u32 = 50;

/// Highest food count in the low-upkeep band
pub const LOW_UPKEEP_MAX_FOOD: u32 = 80;

/// Income multiplier in the low-upkeep band
pub const LOW_UPKEEP_MULT: f32 = 0.7;

/// Income multiplier in the high-upkeep band
pub const HIGH_UPKEEP_MULT: f32 = 0.4;
