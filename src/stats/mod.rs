//! Stats model: immutable unit, hero and ability definitions.
//!
//! Templates are loaded once (built-in roster or a RON file) and shared
//! read-only through [`StatsModel`]. Spawning copies a template by value into
//! a mutable [`UnitStats`] record owned by the simulation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::constants::{MAX_HERO_ABILITIES, MIN_ARMOR};
use crate::error::DataError;

mod builtin;
mod runtime;

pub use runtime::UnitStats;

/// Template identifier (e.g. `"footman"`)
pub type TemplateId = String;

/// Attack damage class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageClass {
    Normal,
    Piercing,
    Siege,
    Magic,
    Chaos,
    Hero,
}

impl DamageClass {
    pub const ALL: [DamageClass; 6] = [
        Self::Normal,
        Self::Piercing,
        Self::Siege,
        Self::Magic,
        Self::Chaos,
        Self::Hero,
    ];

    /// Row index in the damage/armor matrix
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Defender armor class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArmorClass {
    Unarmored,
    Light,
    Medium,
    Heavy,
    Fortified,
    Hero,
    Divine,
}

impl ArmorClass {
    pub const ALL: [ArmorClass; 7] = [
        Self::Unarmored,
        Self::Light,
        Self::Medium,
        Self::Heavy,
        Self::Fortified,
        Self::Hero,
        Self::Divine,
    ];

    /// Column index in the damage/armor matrix
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Melee units get strength damage on heroes, ranged units agility damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttackKind {
    #[default]
    Melee,
    Ranged,
}

/// Valid targets for an ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFilter {
    Enemy,
    Ally,
    SelfOnly,
    Ground,
    Air,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimaryAttribute {
    #[default]
    Strength,
    Agility,
    Intelligence,
}

/// Strength / agility / intelligence triple
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: f32,
    pub agility: f32,
    pub intelligence: f32,
}

impl Attributes {
    pub fn new(strength: f32, agility: f32, intelligence: f32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
        }
    }

    pub fn get(&self, attribute: PrimaryAttribute) -> f32 {
        match attribute {
            PrimaryAttribute::Strength => self.strength,
            PrimaryAttribute::Agility => self.agility,
            PrimaryAttribute::Intelligence => self.intelligence,
        }
    }
}

/// Hero ability with per-level tables (index 0 = ability level 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub id: String,
    pub name: String,
    pub mana_cost: Vec<f32>,
    pub cooldown: Vec<f32>,
    /// Primary effect magnitude per level (damage, heal, duration...)
    pub effect: Vec<f32>,
    #[serde(default = "default_required_level")]
    pub required_hero_level: u32,
    #[serde(default)]
    pub is_ultimate: bool,
    pub target: TargetFilter,
}

fn default_required_level() -> u32 {
    1
}

impl AbilityDefinition {
    pub fn max_level(&self) -> u32 {
        self.mana_cost.len() as u32
    }

    /// Mana cost at a 1-based ability level
    pub fn mana_cost_at(&self, level: u32) -> Option<f32> {
        level_lookup(&self.mana_cost, level)
    }

    pub fn cooldown_at(&self, level: u32) -> Option<f32> {
        level_lookup(&self.cooldown, level)
    }

    pub fn effect_at(&self, level: u32) -> Option<f32> {
        level_lookup(&self.effect, level)
    }

    fn validate(&self) -> Result<(), String> {
        if self.mana_cost.is_empty() {
            return Err(format!("ability '{}' has no levels", self.id));
        }
        if self.cooldown.len() != self.mana_cost.len() || self.effect.len() != self.mana_cost.len()
        {
            return Err(format!(
                "ability '{}' has mismatched per-level tables",
                self.id
            ));
        }
        Ok(())
    }
}

fn level_lookup(table: &[f32], level: u32) -> Option<f32> {
    let idx = level.checked_sub(1)? as usize;
    table.get(idx).copied()
}

/// Hero-only part of a template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeroTemplate {
    pub primary: PrimaryAttribute,
    pub base_attributes: Attributes,
    /// Attribute gain per hero level
    pub growth: Attributes,
    pub abilities: Vec<AbilityDefinition>,
}

/// Immutable per-unit-type definition.
///
/// For heroes `max_hp`, `max_mana` and `armor` are the pre-attribute base
/// values; the progression module adds attribute contributions on spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTemplate {
    pub id: TemplateId,
    pub name: String,
    pub max_hp: f32,
    pub max_mana: f32,
    /// HP regenerated per second
    pub hp_regen: f32,
    pub mana_regen: f32,
    pub armor: f32,
    pub armor_class: ArmorClass,
    pub damage_min: f32,
    pub damage_max: f32,
    pub damage_class: DamageClass,
    pub attack_kind: AttackKind,
    pub move_speed: f32,
    pub attack_range: f32,
    /// Seconds from swing start to impact
    pub cast_point: f32,
    /// Seconds after impact before another swing may start
    pub backswing: f32,
    /// Minimum seconds between swing starts (1 / attack speed)
    pub attack_cooldown: f32,
    pub acquisition_range: f32,
    pub sight_range: f32,
    pub flee_health_percent: f32,
    pub can_flee: bool,
    /// Workers never auto-acquire targets
    pub is_worker: bool,
    pub food_cost: u32,
    pub gold_cost: u32,
    pub lumber_cost: u32,
    /// XP granted to nearby enemy heroes on death
    pub xp_bounty: u32,
    pub hero: Option<HeroTemplate>,
}

impl Default for UnitTemplate {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            max_hp: 100.0,
            max_mana: 0.0,
            hp_regen: 0.0,
            mana_regen: 0.0,
            armor: 0.0,
            armor_class: ArmorClass::Medium,
            damage_min: 1.0,
            damage_max: 1.0,
            damage_class: DamageClass::Normal,
            attack_kind: AttackKind::Melee,
            move_speed: 270.0,
            attack_range: 100.0,
            cast_point: 0.3,
            backswing: 0.3,
            attack_cooldown: 1.0,
            acquisition_range: 500.0,
            sight_range: 1200.0,
            flee_health_percent: 0.0,
            can_flee: false,
            is_worker: false,
            food_cost: 1,
            gold_cost: 0,
            lumber_cost: 0,
            xp_bounty: 0,
            hero: None,
        }
    }
}

impl UnitTemplate {
    pub fn is_hero(&self) -> bool {
        self.hero.is_some()
    }

    /// Check internal consistency of the definition
    pub fn validate(&self) -> Result<(), DataError> {
        let fail = |reason: &str| DataError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.is_empty() {
            return Err(fail("empty id"));
        }
        if self.max_hp <= 0.0 {
            return Err(fail("max_hp must be positive"));
        }
        if self.armor.is_nan() || self.armor <= MIN_ARMOR {
            return Err(fail("armor must stay above the reduction pole (-16.67)"));
        }
        if self.damage_min < 0.0 || self.damage_max < self.damage_min {
            return Err(fail("damage range must satisfy 0 <= min <= max"));
        }
        if self.cast_point < 0.0 || self.backswing < 0.0 || self.attack_cooldown <= 0.0 {
            return Err(fail("attack timings must be non-negative with a positive cooldown"));
        }
        if !(0.0..=1.0).contains(&self.flee_health_percent) {
            return Err(fail("flee_health_percent must be within [0, 1]"));
        }
        if self.move_speed < 0.0 || self.attack_range < 0.0 {
            return Err(fail("speed and range must be non-negative"));
        }
        if let Some(hero) = &self.hero {
            if hero.abilities.len() > MAX_HERO_ABILITIES {
                return Err(fail("heroes carry at most 4 abilities"));
            }
            if hero.abilities.iter().filter(|a| a.is_ultimate).count() > 1 {
                return Err(fail("heroes carry at most one ultimate"));
            }
            for ability in &hero.abilities {
                ability.validate().map_err(|reason| fail(&reason))?;
            }
        }
        Ok(())
    }
}

/// Registry of immutable templates keyed by id
#[derive(Debug, Clone, Default)]
pub struct StatsModel {
    templates: BTreeMap<TemplateId, Arc<UnitTemplate>>,
}

impl StatsModel {
    /// Build a model, validating every template and rejecting duplicate ids
    pub fn new(templates: impl IntoIterator<Item = UnitTemplate>) -> Result<Self, DataError> {
        let mut map = BTreeMap::new();
        for template in templates {
            template.validate()?;
            if map.contains_key(&template.id) {
                return Err(DataError::DuplicateTemplate(template.id));
            }
            map.insert(template.id.clone(), Arc::new(template));
        }
        Ok(Self { templates: map })
    }

    /// Parse a RON list of templates
    pub fn from_ron_str(source: &str) -> Result<Self, DataError> {
        let templates: Vec<UnitTemplate> = ron::from_str(source)?;
        Self::new(templates)
    }

    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Built-in roster used by tests, benches and the demo binary
    pub fn builtin() -> Self {
        let templates = builtin::roster()
            .into_iter()
            .map(|t| (t.id.clone(), Arc::new(t)))
            .collect();
        Self { templates }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<UnitTemplate>> {
        self.templates.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
