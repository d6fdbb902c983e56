use bevy::math::Vec2;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use skirmish_core::balance::{run_duel_series, DuelConfig};
use skirmish_core::{
    ArmorClass, AttackProfile, Command, DamageClass, DamageMatrix, DamageResolver,
    DefenseProfile, PlayerId, SimConfig, Simulation, StatsModel,
};
use std::sync::Arc;

fn bench_damage(c: &mut Criterion) {
    let resolver = DamageResolver::new(Arc::new(DamageMatrix::standard()));
    let attack = AttackProfile {
        damage_min: 12.0,
        damage_max: 13.0,
        bonus_damage: 0.0,
        damage_class: DamageClass::Normal,
    };
    let defense = DefenseProfile {
        armor: 2.0,
        armor_class: ArmorClass::Heavy,
    };
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

    c.bench_function("resolve_damage", |b| {
        b.iter(|| resolver.resolve(black_box(&attack), black_box(&defense), &mut rng))
    });
}

fn battle(units_per_side: u32) -> Simulation {
    let mut sim = Simulation::with_builtin(SimConfig {
        max_units: 1024,
        ..Default::default()
    });
    for i in 0..units_per_side {
        let row = (i / 10) as f32 * 60.0;
        let col = (i % 10) as f32 * 60.0;
        let (blue_t, red_t) = if i % 3 == 0 {
            ("rifleman", "headhunter")
        } else {
            ("footman", "gnoll")
        };
        if let (Ok(blue), Ok(red)) = (
            sim.spawn(blue_t, PlayerId(1), Vec2::new(col, row)),
            sim.spawn(red_t, PlayerId(2), Vec2::new(col + 900.0, row)),
        ) {
            let _ = sim.issue(blue, Command::AttackMove(Vec2::new(1400.0, 300.0)));
            let _ = sim.issue(red, Command::AttackMove(Vec2::new(-400.0, 300.0)));
        }
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick_100_units", |b| {
        b.iter_batched(
            || battle(50),
            |mut sim| {
                for _ in 0..32 {
                    sim.tick(1.0 / 32.0);
                }
                sim.drain_events()
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("state_digest_100_units", |b| {
        let sim = battle(50);
        b.iter(|| black_box(&sim).state_digest())
    });
}

fn bench_duels(c: &mut Criterion) {
    let model = Arc::new(StatsModel::builtin());
    let matrix = Arc::new(DamageMatrix::standard());
    let config = DuelConfig {
        side_a: "knight".into(),
        side_b: "footman".into(),
        count_a: 2,
        count_b: 3,
        runs: 32,
        ..Default::default()
    };

    let mut group = c.benchmark_group("balance");
    group.sample_size(10);
    group.bench_function("duel_series_32", |b| {
        b.iter(|| run_duel_series(&config, Arc::clone(&model), Arc::clone(&matrix)))
    });
    group.finish();
}

criterion_group!(benches, bench_damage, bench_tick, bench_duels);
criterion_main!(benches);
