//! Hero progression: XP curve, attribute-derived stats, ability unlock gating.
//!
//! XP curve (quadratic, monotonic):
//!   xp_for_level(L) = 100 * (L - 1)^2   → L2 = 100, L10 = 8100
//!
//! Unlock tiers: standard abilities gain a usable level at hero levels
//! 1, 3 and 5; the ultimate unlocks at hero level 6.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::*;
use crate::error::InvalidAbilityInvestment;
use crate::stats::{AbilityDefinition, AttackKind, Attributes, HeroTemplate, UnitStats, UnitTemplate};

/// Total XP needed to reach `level` (clamped to 1..=MAX_HERO_LEVEL)
pub fn xp_for_level(level: u32) -> u32 {
    let steps = level.clamp(1, MAX_HERO_LEVEL) - 1;
    XP_CURVE_SCALE * steps * steps
}

/// Highest level whose threshold `xp` meets
pub fn level_for_xp(xp: u32) -> u32 {
    (1..=MAX_HERO_LEVEL)
        .rev()
        .find(|level| xp >= xp_for_level(*level))
        .unwrap_or(1)
}

/// Highest ability level usable at `hero_level`
pub fn unlock_tier(hero_level: u32, ability: &AbilityDefinition) -> u32 {
    if hero_level < ability.required_hero_level {
        return 0;
    }
    let tier = if ability.is_ultimate {
        u32::from(hero_level >= ULTIMATE_UNLOCK_LEVEL)
    } else {
        STANDARD_UNLOCK_LEVELS
            .iter()
            .filter(|unlock| hero_level >= **unlock)
            .count() as u32
    };
    tier.min(ability.max_level())
}

/// Usable level = min(unlock tier, invested level)
pub fn effective_ability_level(hero_level: u32, ability: &AbilityDefinition, invested: u32) -> u32 {
    unlock_tier(hero_level, ability).min(invested)
}

/// Attributes at a given hero level
pub fn attributes_at(hero: &HeroTemplate, level: u32) -> Attributes {
    let steps = (level.max(1) - 1) as f32;
    Attributes {
        strength: hero.base_attributes.strength + hero.growth.strength * steps,
        agility: hero.base_attributes.agility + hero.growth.agility * steps,
        intelligence: hero.base_attributes.intelligence + hero.growth.intelligence * steps,
    }
}

/// Stats derived from a hero's attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub max_hp: f32,
    pub max_mana: f32,
    pub armor: f32,
    pub bonus_damage: f32,
    /// Multiplicative attack speed bonus (0.46 = +46%)
    pub attack_speed_bonus: f32,
    pub attack_cooldown: f32,
    /// Multiplicative spell damage bonus
    pub spell_damage_bonus: f32,
}

impl DerivedStats {
    pub fn compute(template: &UnitTemplate, attributes: &Attributes) -> Self {
        let attack_speed_bonus = attributes.agility * ATTACK_SPEED_PER_AGILITY;
        let bonus_damage = match template.attack_kind {
            AttackKind::Melee => attributes.strength * MELEE_DAMAGE_PER_STRENGTH,
            AttackKind::Ranged => attributes.agility * RANGED_DAMAGE_PER_AGILITY,
        };
        Self {
            max_hp: template.max_hp + attributes.strength * HP_PER_STRENGTH,
            max_mana: template.max_mana + attributes.intelligence * MANA_PER_INTELLIGENCE,
            armor: template.armor + attributes.agility * ARMOR_PER_AGILITY,
            bonus_damage,
            attack_speed_bonus,
            attack_cooldown: template.attack_cooldown / (1.0 + attack_speed_bonus.max(0.0)),
            spell_damage_bonus: attributes.intelligence * SPELL_DAMAGE_PER_INTELLIGENCE,
        }
    }

    /// Write derived values into a live record, keeping HP/MP fractions
    pub fn apply(&self, stats: &mut UnitStats) {
        let hp_fraction = stats.hp_fraction();
        let mana_fraction = if stats.max_mana > 0.0 {
            stats.mana / stats.max_mana
        } else {
            1.0
        };
        stats.max_hp = self.max_hp;
        stats.max_mana = self.max_mana;
        stats.armor = self.armor;
        stats.bonus_damage = self.bonus_damage;
        stats.attack_cooldown = self.attack_cooldown;
        if stats.is_alive() {
            stats.hp = (self.max_hp * hp_fraction).clamp(f32::MIN_POSITIVE, self.max_hp);
        }
        stats.mana = (self.max_mana * mana_fraction).clamp(0.0, self.max_mana);
    }
}

/// Runtime hero progression attached to a hero unit
#[derive(Debug, Clone)]
pub struct HeroState {
    template: Arc<UnitTemplate>,
    hero: HeroTemplate,
    pub level: u32,
    pub xp: u32,
    pub skill_points: u32,
    /// Invested level per ability slot
    pub ability_levels: Vec<u32>,
}

impl HeroState {
    /// `None` if the template is not a hero
    pub fn new(template: Arc<UnitTemplate>) -> Option<Self> {
        let hero = template.hero.clone()?;
        let slots = hero.abilities.len();
        Some(Self {
            template,
            hero,
            level: 1,
            xp: 0,
            skill_points: 1,
            ability_levels: vec![0; slots],
        })
    }

    pub fn abilities(&self) -> &[AbilityDefinition] {
        &self.hero.abilities
    }

    pub fn attributes(&self) -> Attributes {
        attributes_at(&self.hero, self.level)
    }

    pub fn derived(&self) -> DerivedStats {
        DerivedStats::compute(&self.template, &self.attributes())
    }

    /// XP still needed for the next level, `None` at max level
    pub fn xp_to_next(&self) -> Option<u32> {
        (self.level < MAX_HERO_LEVEL).then(|| xp_for_level(self.level + 1) - self.xp)
    }

    /// Add XP; returns the number of levels gained. Each level grants a
    /// skill point. XP stops accruing at max level.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        let cap = xp_for_level(MAX_HERO_LEVEL);
        self.xp = self.xp.saturating_add(amount).min(cap);
        let new_level = level_for_xp(self.xp);
        let gained = new_level.saturating_sub(self.level);
        self.level = new_level.max(self.level);
        self.skill_points += gained;
        gained
    }

    pub fn unlock_tier(&self, slot: usize) -> Option<u32> {
        self.abilities()
            .get(slot)
            .map(|ability| unlock_tier(self.level, ability))
    }

    pub fn usable_level(&self, slot: usize) -> u32 {
        match (self.abilities().get(slot), self.ability_levels.get(slot)) {
            (Some(ability), Some(invested)) => {
                effective_ability_level(self.level, ability, *invested)
            }
            _ => 0,
        }
    }

    /// Validate raising `slot` to `target_level` without mutating anything
    pub fn check_investment(
        &self,
        slot: usize,
        target_level: u32,
    ) -> Result<(), InvalidAbilityInvestment> {
        let ability = self
            .abilities()
            .get(slot)
            .ok_or(InvalidAbilityInvestment::NoSuchSlot(slot))?;
        if target_level > ability.max_level() {
            return Err(InvalidAbilityInvestment::ExceedsMaxLevel {
                target: target_level,
                max: ability.max_level(),
            });
        }
        let tier = unlock_tier(self.level, ability);
        if target_level > tier {
            return Err(InvalidAbilityInvestment::ExceedsUnlockTier {
                target: target_level,
                tier,
                hero_level: self.level,
            });
        }
        if self.skill_points == 0 {
            return Err(InvalidAbilityInvestment::NoSkillPoints);
        }
        Ok(())
    }

    /// Spend one skill point on `slot`; returns the new invested level
    pub fn invest(&mut self, slot: usize) -> Result<u32, InvalidAbilityInvestment> {
        let current = self.ability_levels.get(slot).copied().unwrap_or(0);
        let target = current + 1;
        self.check_investment(slot, target)?;
        self.ability_levels[slot] = target;
        self.skill_points -= 1;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsModel;

    fn hero(id: &str) -> HeroState {
        let model = StatsModel::builtin();
        HeroState::new(model.get(id).unwrap().clone()).unwrap()
    }

    #[test]
    fn test_xp_curve_anchors() {
        assert_eq!(xp_for_level(1), 0);
        assert_eq!(xp_for_level(2), 100);
        assert_eq!(xp_for_level(10), 8100);
        assert!(xp_for_level(10) / xp_for_level(2) >= 50);
    }

    #[test]
    fn test_xp_curve_monotonic() {
        for level in 1..MAX_HERO_LEVEL {
            assert!(xp_for_level(level + 1) > xp_for_level(level));
        }
    }

    #[test]
    fn test_level_for_xp_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(8099), 9);
        assert_eq!(level_for_xp(u32::MAX), 10);
    }

    #[test]
    fn test_standard_unlock_tiers() {
        let h = hero("blademaster");
        let standard = &h.abilities()[0];
        assert_eq!(unlock_tier(1, standard), 1);
        assert_eq!(unlock_tier(2, standard), 1);
        assert_eq!(unlock_tier(3, standard), 2);
        assert_eq!(unlock_tier(5, standard), 3);
        assert_eq!(unlock_tier(10, standard), 3);
    }

    #[test]
    fn test_ultimate_unlocks_at_six() {
        let h = hero("blademaster");
        let ultimate = &h.abilities()[3];
        assert!(ultimate.is_ultimate);
        assert_eq!(unlock_tier(5, ultimate), 0);
        assert_eq!(unlock_tier(6, ultimate), 1);
    }

    #[test]
    fn test_investment_past_tier_rejected() {
        let mut h = hero("blademaster");
        assert_eq!(h.invest(0), Ok(1));
        h.skill_points = 5;
        let err = h.invest(0).unwrap_err();
        assert_eq!(
            err,
            InvalidAbilityInvestment::ExceedsUnlockTier {
                target: 2,
                tier: 1,
                hero_level: 1
            }
        );
        assert_eq!(h.ability_levels[0], 1, "rejected investment must not clamp");
        assert_eq!(h.skill_points, 5, "rejected investment keeps the point");
    }

    #[test]
    fn test_ultimate_investment_rejected_before_six() {
        let mut h = hero("archmage");
        assert!(matches!(
            h.invest(3),
            Err(InvalidAbilityInvestment::ExceedsUnlockTier { tier: 0, .. })
        ));
        h.add_xp(xp_for_level(6));
        assert_eq!(h.level, 6);
        assert_eq!(h.invest(3), Ok(1));
    }

    #[test]
    fn test_investment_needs_skill_points() {
        let mut h = hero("archmage");
        h.invest(0).unwrap();
        assert_eq!(h.invest(1), Err(InvalidAbilityInvestment::NoSkillPoints));
        assert_eq!(h.invest(9), Err(InvalidAbilityInvestment::NoSuchSlot(9)));
    }

    #[test]
    fn test_level_up_grants_skill_points() {
        let mut h = hero("blademaster");
        let gained = h.add_xp(xp_for_level(3));
        assert_eq!(gained, 2);
        assert_eq!(h.level, 3);
        assert_eq!(h.skill_points, 3);
        h.add_xp(u32::MAX);
        assert_eq!(h.level, MAX_HERO_LEVEL);
        assert_eq!(h.xp_to_next(), None);
    }

    #[test]
    fn test_derived_stats_linear_in_attributes() {
        let h = hero("blademaster");
        let attrs = h.attributes();
        let derived = h.derived();
        assert_eq!(derived.max_hp, 100.0 + attrs.strength * HP_PER_STRENGTH);
        assert_eq!(derived.max_mana, attrs.intelligence * MANA_PER_INTELLIGENCE);
        assert_eq!(derived.bonus_damage, attrs.strength);
        assert!(derived.attack_cooldown < 1.77);

        let mage = hero("archmage");
        assert_eq!(mage.derived().bonus_damage, mage.attributes().agility);
    }

    #[test]
    fn test_apply_preserves_hp_fraction() {
        let model = StatsModel::builtin();
        let template = model.get("blademaster").unwrap().clone();
        let mut h = HeroState::new(template.clone()).unwrap();
        let mut stats = UnitStats::from_template(
            crate::unit::UnitId(1),
            crate::unit::PlayerId(1),
            bevy::math::Vec2::ZERO,
            &template,
        );
        h.derived().apply(&mut stats);
        stats.hp = stats.max_hp * 0.5;
        h.add_xp(xp_for_level(2));
        h.derived().apply(&mut stats);
        assert!((stats.hp_fraction() - 0.5).abs() < 1e-4);
    }
}
