//! Built-in unit roster.

use super::{
    AbilityDefinition, ArmorClass, AttackKind, Attributes, DamageClass, HeroTemplate,
    PrimaryAttribute, TargetFilter, UnitTemplate,
};

pub(super) fn roster() -> Vec<UnitTemplate> {
    vec![
        UnitTemplate {
            id: "peasant".into(),
            name: "Peasant".into(),
            max_hp: 220.0,
            armor: 0.0,
            armor_class: ArmorClass::Medium,
            damage_min: 5.0,
            damage_max: 6.0,
            move_speed: 190.0,
            attack_range: 90.0,
            cast_point: 0.43,
            backswing: 0.57,
            attack_cooldown: 2.0,
            acquisition_range: 200.0,
            sight_range: 800.0,
            flee_health_percent: 0.5,
            can_flee: true,
            is_worker: true,
            gold_cost: 75,
            xp_bounty: 10,
            ..Default::default()
        },
        UnitTemplate {
            id: "footman".into(),
            name: "Footman".into(),
            max_hp: 420.0,
            hp_regen: 0.25,
            armor: 2.0,
            armor_class: ArmorClass::Heavy,
            damage_min: 12.0,
            damage_max: 13.0,
            move_speed: 270.0,
            attack_range: 90.0,
            cast_point: 0.5,
            backswing: 0.5,
            attack_cooldown: 1.35,
            acquisition_range: 500.0,
            sight_range: 1400.0,
            food_cost: 2,
            gold_cost: 135,
            xp_bounty: 25,
            ..Default::default()
        },
        UnitTemplate {
            id: "rifleman".into(),
            name: "Rifleman".into(),
            max_hp: 535.0,
            hp_regen: 0.25,
            armor: 0.0,
            armor_class: ArmorClass::Medium,
            damage_min: 19.0,
            damage_max: 23.0,
            damage_class: DamageClass::Piercing,
            attack_kind: AttackKind::Ranged,
            move_speed: 270.0,
            attack_range: 500.0,
            cast_point: 0.17,
            backswing: 0.73,
            attack_cooldown: 1.5,
            acquisition_range: 600.0,
            sight_range: 1400.0,
            food_cost: 3,
            gold_cost: 205,
            lumber_cost: 30,
            xp_bounty: 30,
            ..Default::default()
        },
        UnitTemplate {
            id: "knight".into(),
            name: "Knight".into(),
            max_hp: 835.0,
            hp_regen: 0.5,
            armor: 5.0,
            armor_class: ArmorClass::Heavy,
            damage_min: 25.0,
            damage_max: 35.0,
            move_speed: 350.0,
            attack_range: 100.0,
            cast_point: 0.66,
            backswing: 0.34,
            attack_cooldown: 1.4,
            acquisition_range: 500.0,
            sight_range: 1400.0,
            food_cost: 4,
            gold_cost: 245,
            lumber_cost: 60,
            xp_bounty: 50,
            ..Default::default()
        },
        UnitTemplate {
            id: "headhunter".into(),
            name: "Troll Headhunter".into(),
            max_hp: 350.0,
            hp_regen: 0.25,
            armor: 0.0,
            armor_class: ArmorClass::Medium,
            damage_min: 23.0,
            damage_max: 27.0,
            damage_class: DamageClass::Piercing,
            attack_kind: AttackKind::Ranged,
            move_speed: 270.0,
            attack_range: 450.0,
            cast_point: 0.31,
            backswing: 0.51,
            attack_cooldown: 2.31,
            acquisition_range: 600.0,
            sight_range: 1200.0,
            food_cost: 2,
            gold_cost: 135,
            lumber_cost: 20,
            xp_bounty: 25,
            ..Default::default()
        },
        UnitTemplate {
            id: "mortar_team".into(),
            name: "Mortar Team".into(),
            max_hp: 360.0,
            armor: 0.0,
            armor_class: ArmorClass::Heavy,
            damage_min: 51.0,
            damage_max: 62.0,
            damage_class: DamageClass::Siege,
            attack_kind: AttackKind::Ranged,
            move_speed: 270.0,
            attack_range: 1150.0,
            cast_point: 1.0,
            backswing: 0.0,
            attack_cooldown: 3.5,
            acquisition_range: 1150.0,
            sight_range: 1200.0,
            food_cost: 3,
            gold_cost: 180,
            lumber_cost: 70,
            xp_bounty: 35,
            ..Default::default()
        },
        UnitTemplate {
            id: "gnoll".into(),
            name: "Gnoll Poacher".into(),
            max_hp: 240.0,
            hp_regen: 0.5,
            armor: 0.0,
            armor_class: ArmorClass::Light,
            damage_min: 10.0,
            damage_max: 12.0,
            damage_class: DamageClass::Piercing,
            attack_kind: AttackKind::Ranged,
            move_speed: 270.0,
            attack_range: 500.0,
            cast_point: 0.3,
            backswing: 0.7,
            attack_cooldown: 2.0,
            acquisition_range: 500.0,
            sight_range: 1000.0,
            flee_health_percent: 0.15,
            can_flee: true,
            food_cost: 0,
            xp_bounty: 20,
            ..Default::default()
        },
        UnitTemplate {
            id: "blademaster".into(),
            name: "Blademaster".into(),
            max_hp: 100.0,
            max_mana: 0.0,
            hp_regen: 0.5,
            mana_regen: 0.5,
            armor: 0.0,
            armor_class: ArmorClass::Hero,
            damage_min: 1.0,
            damage_max: 11.0,
            damage_class: DamageClass::Hero,
            move_speed: 320.0,
            attack_range: 100.0,
            cast_point: 0.3,
            backswing: 0.5,
            attack_cooldown: 1.77,
            acquisition_range: 600.0,
            sight_range: 1800.0,
            food_cost: 5,
            gold_cost: 425,
            lumber_cost: 100,
            xp_bounty: 100,
            hero: Some(HeroTemplate {
                primary: PrimaryAttribute::Agility,
                base_attributes: Attributes::new(18.0, 23.0, 16.0),
                growth: Attributes::new(2.0, 1.75, 1.5),
                abilities: vec![
                    ability(
                        "wind_walk",
                        "Wind Walk",
                        [75.0, 75.0, 75.0],
                        [5.0, 5.0, 5.0],
                        [40.0, 70.0, 100.0],
                        TargetFilter::SelfOnly,
                    ),
                    ability(
                        "mirror_image",
                        "Mirror Image",
                        [125.0, 125.0, 125.0],
                        [3.0, 3.0, 3.0],
                        [1.0, 2.0, 3.0],
                        TargetFilter::SelfOnly,
                    ),
                    ability(
                        "critical_strike",
                        "Critical Strike",
                        [0.0, 0.0, 0.0],
                        [0.0, 0.0, 0.0],
                        [2.0, 3.0, 4.0],
                        TargetFilter::Enemy,
                    ),
                    AbilityDefinition {
                        required_hero_level: 6,
                        is_ultimate: true,
                        ..ability(
                            "bladestorm",
                            "Bladestorm",
                            [200.0],
                            [180.0],
                            [110.0],
                            TargetFilter::Ground,
                        )
                    },
                ],
            }),
            ..Default::default()
        },
        UnitTemplate {
            id: "archmage".into(),
            name: "Archmage".into(),
            max_hp: 100.0,
            max_mana: 0.0,
            hp_regen: 0.25,
            mana_regen: 1.0,
            armor: 0.0,
            armor_class: ArmorClass::Hero,
            damage_min: 2.0,
            damage_max: 8.0,
            damage_class: DamageClass::Hero,
            attack_kind: AttackKind::Ranged,
            move_speed: 320.0,
            attack_range: 600.0,
            cast_point: 0.55,
            backswing: 0.45,
            attack_cooldown: 2.13,
            acquisition_range: 600.0,
            sight_range: 1800.0,
            flee_health_percent: 0.2,
            can_flee: true,
            food_cost: 5,
            gold_cost: 425,
            lumber_cost: 100,
            xp_bounty: 100,
            hero: Some(HeroTemplate {
                primary: PrimaryAttribute::Intelligence,
                base_attributes: Attributes::new(14.0, 17.0, 19.0),
                growth: Attributes::new(1.8, 1.0, 3.2),
                abilities: vec![
                    ability(
                        "blizzard",
                        "Blizzard",
                        [75.0, 75.0, 75.0],
                        [6.0, 6.0, 6.0],
                        [30.0, 40.0, 50.0],
                        TargetFilter::Ground,
                    ),
                    ability(
                        "water_elemental",
                        "Summon Water Elemental",
                        [125.0, 125.0, 125.0],
                        [20.0, 20.0, 20.0],
                        [1.0, 2.0, 3.0],
                        TargetFilter::SelfOnly,
                    ),
                    ability(
                        "brilliance_aura",
                        "Brilliance Aura",
                        [0.0, 0.0, 0.0],
                        [0.0, 0.0, 0.0],
                        [0.75, 1.5, 2.25],
                        TargetFilter::Ally,
                    ),
                    AbilityDefinition {
                        required_hero_level: 6,
                        is_ultimate: true,
                        ..ability(
                            "mass_teleport",
                            "Mass Teleport",
                            [100.0],
                            [20.0],
                            [24.0],
                            TargetFilter::Ally,
                        )
                    },
                ],
            }),
            ..Default::default()
        },
    ]
}

fn ability<const N: usize>(
    id: &str,
    name: &str,
    mana_cost: [f32; N],
    cooldown: [f32; N],
    effect: [f32; N],
    target: TargetFilter,
) -> AbilityDefinition {
    AbilityDefinition {
        id: id.into(),
        name: name.into(),
        mana_cost: mana_cost.to_vec(),
        cooldown: cooldown.to_vec(),
        effect: effect.to_vec(),
        required_hero_level: 1,
        is_ultimate: false,
        target,
    }
}
