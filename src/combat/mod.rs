//! Damage resolution.
//!
//! ```text
//! armor_reduction  = (armor * 0.06) / (1 + armor * 0.06)
//! type_multiplier  = matrix[damage_class][armor_class]
//! raw_damage       = min + uniform(0, max - min) + bonus
//! effective_damage = raw_damage * type_multiplier * (1 - armor_reduction)
//! ```
//!
//! Negative armor is valid input down to [`MIN_ARMOR`] (exclusive): the
//! reduction goes negative and the hit gets stronger. The roll is drawn from whatever [`rand::Rng`] the caller
//! passes in, so a seeded stream reproduces every hit.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{ARMOR_REDUCTION_FACTOR, MIN_ARMOR};
use crate::stats::{ArmorClass, DamageClass};

pub mod matrix;

pub use matrix::{DamageMatrix, MatrixEntry};

/// Attacker side of a hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub damage_min: f32,
    pub damage_max: f32,
    /// Flat bonus added to the roll before multipliers
    pub bonus_damage: f32,
    pub damage_class: DamageClass,
}

/// Defender side of a hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfile {
    pub armor: f32,
    pub armor_class: ArmorClass,
}

/// Breakdown of a resolved hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub raw_damage: f32,
    pub type_multiplier: f32,
    pub armor_reduction: f32,
    pub effective_damage: f32,
}

/// Fraction of damage removed by `armor`. Strictly increasing, below 1.0,
/// zero at zero armor and negative for negative armor.
pub fn armor_reduction(armor: f32) -> f32 {
    let scaled = armor * ARMOR_REDUCTION_FACTOR;
    scaled / (1.0 + scaled)
}

/// Stateless resolver over a shared, immutable matrix
#[derive(Debug, Clone, Default)]
pub struct DamageResolver {
    matrix: Arc<DamageMatrix>,
}

impl DamageResolver {
    pub fn new(matrix: Arc<DamageMatrix>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &DamageMatrix {
        &self.matrix
    }

    /// Resolve a hit drawing the damage roll from `rng`
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        attack: &AttackProfile,
        defense: &DefenseProfile,
        rng: &mut R,
    ) -> DamageOutcome {
        let spread = (attack.damage_max - attack.damage_min).max(0.0);
        let roll = if spread > 0.0 {
            rng.gen_range(0.0..=spread)
        } else {
            0.0
        };
        self.resolve_with_roll(attack, defense, roll)
    }

    /// Resolve a hit with an explicit roll in `[0, max - min]`
    pub fn resolve_with_roll(
        &self,
        attack: &AttackProfile,
        defense: &DefenseProfile,
        roll: f32,
    ) -> DamageOutcome {
        debug_assert!(
            defense.armor > MIN_ARMOR,
            "armor {} at or below the reduction pole",
            defense.armor
        );
        let raw_damage = attack.damage_min + roll + attack.bonus_damage;
        let type_multiplier = self
            .matrix
            .multiplier(attack.damage_class, defense.armor_class);
        let reduction = armor_reduction(defense.armor);
        let effective_damage = (raw_damage * type_multiplier * (1.0 - reduction)).max(0.0);

        tracing::trace!(
            raw_damage,
            type_multiplier,
            reduction,
            effective_damage,
            "resolved hit"
        );

        DamageOutcome {
            raw_damage,
            type_multiplier,
            armor_reduction: reduction,
            effective_damage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn resolver() -> DamageResolver {
        DamageResolver::new(Arc::new(DamageMatrix::standard()))
    }

    fn attack(min: f32, max: f32, class: DamageClass) -> AttackProfile {
        AttackProfile {
            damage_min: min,
            damage_max: max,
            bonus_damage: 0.0,
            damage_class: class,
        }
    }

    #[test]
    fn test_zero_armor_has_no_reduction() {
        assert_eq!(armor_reduction(0.0), 0.0);
        let out = resolver().resolve_with_roll(
            &attack(20.0, 20.0, DamageClass::Piercing),
            &DefenseProfile {
                armor: 0.0,
                armor_class: ArmorClass::Light,
            },
            0.0,
        );
        assert_eq!(out.effective_damage, out.raw_damage * out.type_multiplier);
        assert_eq!(out.effective_damage, 40.0);
    }

    #[test]
    fn test_footman_vs_medium_armor_reference() {
        let r = resolver();
        let atk = attack(12.0, 13.0, DamageClass::Normal);
        let def = DefenseProfile {
            armor: 2.0,
            armor_class: ArmorClass::Medium,
        };
        assert!((armor_reduction(2.0) - 0.1071).abs() < 1e-4);

        let low = r.resolve_with_roll(&atk, &def, 0.0).effective_damage;
        let high = r.resolve_with_roll(&atk, &def, 1.0).effective_damage;
        assert!((low - 10.71).abs() < 0.01, "low = {low}");
        assert!((high - 11.61).abs() < 0.01, "high = {high}");
    }

    #[test]
    fn test_piercing_vs_light_reference() {
        let out = resolver().resolve_with_roll(
            &attack(20.0, 20.0, DamageClass::Piercing),
            &DefenseProfile {
                armor: 5.0,
                armor_class: ArmorClass::Light,
            },
            0.0,
        );
        let expected = 20.0 * 2.0 * (1.0 - 0.3 / 1.3);
        assert!((out.effective_damage - expected).abs() < 1e-4);
    }

    #[test]
    fn test_negative_armor_amplifies() {
        assert!(armor_reduction(-3.0) < 0.0);
        let out = resolver().resolve_with_roll(
            &attack(10.0, 10.0, DamageClass::Normal),
            &DefenseProfile {
                armor: -3.0,
                armor_class: ArmorClass::Heavy,
            },
            0.0,
        );
        assert!(out.effective_damage > 10.0);
    }

    #[test]
    fn test_damage_grows_toward_armor_floor() {
        let r = resolver();
        let atk = attack(10.0, 10.0, DamageClass::Normal);
        let hit = |armor: f32| {
            r.resolve_with_roll(
                &atk,
                &DefenseProfile {
                    armor,
                    armor_class: ArmorClass::Medium,
                },
                0.0,
            )
            .effective_damage
        };
        let mut previous = hit(0.0);
        for armor in [-5.0, -10.0, -15.0, -16.0, -16.5] {
            let current = hit(armor);
            assert!(current.is_finite());
            assert!(current > previous, "armor {armor}: {current} <= {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_bonus_damage_added_before_multipliers() {
        let atk = AttackProfile {
            bonus_damage: 5.0,
            ..attack(10.0, 10.0, DamageClass::Piercing)
        };
        let out = resolver().resolve_with_roll(
            &atk,
            &DefenseProfile {
                armor: 0.0,
                armor_class: ArmorClass::Light,
            },
            0.0,
        );
        assert_eq!(out.raw_damage, 15.0);
        assert_eq!(out.effective_damage, 30.0);
    }

    #[test]
    fn test_seeded_rolls_are_reproducible_and_bounded() {
        let r = resolver();
        let atk = attack(12.0, 13.0, DamageClass::Normal);
        let def = DefenseProfile {
            armor: 2.0,
            armor_class: ArmorClass::Medium,
        };
        let mut a = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut b = Xoshiro256PlusPlus::seed_from_u64(7);
        for _ in 0..100 {
            let x = r.resolve(&atk, &def, &mut a);
            let y = r.resolve(&atk, &def, &mut b);
            assert_eq!(x, y);
            assert!(x.raw_damage >= 12.0 && x.raw_damage <= 13.0);
        }
    }
}
