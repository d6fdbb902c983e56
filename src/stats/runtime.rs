use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{ArmorClass, AttackKind, DamageClass, TemplateId, UnitTemplate};
use crate::combat::{AttackProfile, DefenseProfile};
use crate::unit::{PlayerId, UnitId};

/// Mutable per-instance stats, copied from a template at spawn.
///
/// Invariant: `0 <= hp <= max_hp`; the unit is dead iff `hp == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub id: UnitId,
    pub owner: PlayerId,
    pub template: TemplateId,
    pub position: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub hp_regen: f32,
    pub mana_regen: f32,
    pub armor: f32,
    pub armor_class: ArmorClass,
    pub damage_min: f32,
    pub damage_max: f32,
    /// Flat attacker bonus added to every roll (hero attributes)
    pub bonus_damage: f32,
    pub damage_class: DamageClass,
    pub attack_kind: AttackKind,
    pub move_speed: f32,
    pub attack_range: f32,
    pub cast_point: f32,
    pub backswing: f32,
    pub attack_cooldown: f32,
    pub acquisition_range: f32,
    pub sight_range: f32,
    pub flee_health_percent: f32,
    pub can_flee: bool,
    pub is_worker: bool,
    pub xp_bounty: u32,
}

impl UnitStats {
    pub fn from_template(
        id: UnitId,
        owner: PlayerId,
        position: Vec2,
        template: &UnitTemplate,
    ) -> Self {
        Self {
            id,
            owner,
            template: template.id.clone(),
            position,
            hp: template.max_hp,
            max_hp: template.max_hp,
            mana: template.max_mana,
            max_mana: template.max_mana,
            hp_regen: template.hp_regen,
            mana_regen: template.mana_regen,
            armor: template.armor,
            armor_class: template.armor_class,
            damage_min: template.damage_min,
            damage_max: template.damage_max,
            bonus_damage: 0.0,
            damage_class: template.damage_class,
            attack_kind: template.attack_kind,
            move_speed: template.move_speed,
            attack_range: template.attack_range,
            cast_point: template.cast_point,
            backswing: template.backswing,
            attack_cooldown: template.attack_cooldown,
            acquisition_range: template.acquisition_range,
            sight_range: template.sight_range,
            flee_health_percent: template.flee_health_percent,
            can_flee: template.can_flee,
            is_worker: template.is_worker,
            xp_bounty: template.xp_bounty,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            self.hp / self.max_hp
        }
    }

    /// Subtract damage, clamping at zero. Returns the HP actually removed.
    /// Dead units take nothing.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || !(amount > 0.0) {
            return 0.0;
        }
        let applied = amount.min(self.hp);
        self.hp -= applied;
        if self.hp <= 0.0 {
            self.hp = 0.0;
        }
        applied
    }

    /// Restore HP up to `max_hp`. Returns the HP actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || !(amount > 0.0) {
            return 0.0;
        }
        let restored = amount.min(self.max_hp - self.hp);
        self.hp += restored;
        restored
    }

    pub fn regenerate(&mut self, dt: f32) {
        if !self.is_alive() {
            return;
        }
        self.hp = (self.hp + self.hp_regen * dt).min(self.max_hp);
        self.mana = (self.mana + self.mana_regen * dt).clamp(0.0, self.max_mana);
    }

    pub fn attack_profile(&self) -> AttackProfile {
        AttackProfile {
            damage_min: self.damage_min,
            damage_max: self.damage_max,
            bonus_damage: self.bonus_damage,
            damage_class: self.damage_class,
        }
    }

    pub fn defense_profile(&self) -> DefenseProfile {
        DefenseProfile {
            armor: self.armor,
            armor_class: self.armor_class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsModel;

    fn footman() -> UnitStats {
        let model = StatsModel::builtin();
        UnitStats::from_template(
            UnitId(1),
            PlayerId(1),
            Vec2::ZERO,
            model.get("footman").unwrap(),
        )
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut unit = footman();
        let applied = unit.take_damage(10_000.0);
        assert_eq!(applied, 420.0);
        assert_eq!(unit.hp, 0.0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn test_dead_units_ignore_damage_and_healing() {
        let mut unit = footman();
        unit.take_damage(10_000.0);
        assert_eq!(unit.take_damage(5.0), 0.0);
        assert_eq!(unit.heal(50.0), 0.0);
        unit.regenerate(10.0);
        assert_eq!(unit.hp, 0.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut unit = footman();
        unit.take_damage(20.0);
        assert_eq!(unit.heal(100.0), 20.0);
        assert_eq!(unit.hp, unit.max_hp);
    }

    #[test]
    fn test_negative_amounts_are_ignored() {
        let mut unit = footman();
        assert_eq!(unit.take_damage(-5.0), 0.0);
        assert_eq!(unit.take_damage(f32::NAN), 0.0);
        assert_eq!(unit.hp, 420.0);
    }
}
