//! Monte-Carlo duel balance.
//!
//! Runs many seeded skirmishes between two squads in parallel with rayon and
//! reports win rates and time-to-kill. Every run gets its own seed derived
//! from the base seed with SHA3, so a report is reproducible regardless of
//! thread scheduling.

use bevy::math::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::sync::Arc;

use crate::combat::DamageMatrix;
use crate::engine::{digest_to_u64, SimConfig, Simulation};
use crate::error::{DuelError, SpawnError};
use crate::logging::TimingSpan;
use crate::stats::{StatsModel, TemplateId};
use crate::unit::{Command, PlayerId};

const SIDE_A: PlayerId = PlayerId(1);
const SIDE_B: PlayerId = PlayerId(2);
const SQUAD_SPACING: f32 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelConfig {
    pub side_a: TemplateId,
    pub side_b: TemplateId,
    pub count_a: u32,
    pub count_b: u32,
    pub runs: u64,
    pub base_seed: u64,
    /// Simulated seconds before a run is called a draw
    pub max_duration: f32,
    /// Starting distance between the squads
    pub separation: f32,
    pub tick_rate: u32,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            side_a: "footman".into(),
            side_b: "footman".into(),
            count_a: 1,
            count_b: 1,
            runs: 200,
            base_seed: 42,
            max_duration: 120.0,
            separation: 300.0,
            tick_rate: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    SideA,
    SideB,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub seed: u64,
    /// `None` on a draw (timeout or mutual wipe)
    pub winner: Option<Winner>,
    pub duration: f32,
    pub survivors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelReport {
    pub runs: u64,
    pub wins_a: u64,
    pub wins_b: u64,
    pub draws: u64,
    pub win_rate_a: f32,
    /// Mean duration of decided runs
    pub mean_time_to_kill: f32,
    /// Matrix multiplier of A's damage against B's armor
    pub multiplier_a_vs_b: f32,
    pub multiplier_b_vs_a: f32,
}

/// Seed of run `index`
pub fn run_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    digest_to_u64(&hasher.finalize())
}

/// Play one seeded skirmish to completion
pub fn run_duel(
    config: &DuelConfig,
    seed: u64,
    model: Arc<StatsModel>,
    matrix: Arc<DamageMatrix>,
) -> Result<DuelOutcome, DuelError> {
    let sim_config = SimConfig {
        seed,
        tick_rate: config.tick_rate,
        ..Default::default()
    };
    let dt = sim_config.tick_duration();
    let mut sim = Simulation::new(sim_config, model, matrix);

    let a_front = Vec2::ZERO;
    let b_front = Vec2::new(config.separation, 0.0);
    let mut squad = Vec::new();
    for i in 0..config.count_a {
        let pos = a_front + Vec2::new(0.0, i as f32 * SQUAD_SPACING);
        squad.push((sim.spawn(&config.side_a, SIDE_A, pos)?, b_front));
    }
    for i in 0..config.count_b {
        let pos = b_front + Vec2::new(0.0, i as f32 * SQUAD_SPACING);
        squad.push((sim.spawn(&config.side_b, SIDE_B, pos)?, a_front));
    }
    for (id, goal) in squad {
        sim.issue(id, Command::AttackMove(goal))?;
    }

    while sim.elapsed() < f64::from(config.max_duration) {
        if sim.living_count(SIDE_A) == 0 || sim.living_count(SIDE_B) == 0 {
            break;
        }
        sim.tick(dt);
        sim.drain_events();
    }

    let (alive_a, alive_b) = (sim.living_count(SIDE_A), sim.living_count(SIDE_B));
    let winner = match (alive_a > 0, alive_b > 0) {
        (true, false) => Some(Winner::SideA),
        (false, true) => Some(Winner::SideB),
        _ => None,
    };
    Ok(DuelOutcome {
        seed,
        winner,
        duration: sim.elapsed() as f32,
        survivors: alive_a + alive_b,
    })
}

/// Run the whole series in parallel
pub fn run_duel_series(
    config: &DuelConfig,
    model: Arc<StatsModel>,
    matrix: Arc<DamageMatrix>,
) -> Result<DuelReport, DuelError> {
    let a = model
        .get(&config.side_a)
        .cloned()
        .ok_or_else(|| SpawnError::UnknownTemplate(config.side_a.clone()))?;
    let b = model
        .get(&config.side_b)
        .cloned()
        .ok_or_else(|| SpawnError::UnknownTemplate(config.side_b.clone()))?;

    let _timing = TimingSpan::new("duel_series");
    let outcomes: Vec<DuelOutcome> = (0..config.runs)
        .into_par_iter()
        .map(|i| {
            run_duel(
                config,
                run_seed(config.base_seed, i),
                Arc::clone(&model),
                Arc::clone(&matrix),
            )
        })
        .collect::<Result<_, _>>()?;

    let report = summarize(
        &outcomes,
        matrix.multiplier(a.damage_class, b.armor_class),
        matrix.multiplier(b.damage_class, a.armor_class),
    );
    tracing::info!(
        a = %config.side_a,
        b = %config.side_b,
        runs = report.runs,
        win_rate_a = report.win_rate_a,
        draws = report.draws,
        "duel series finished"
    );
    Ok(report)
}

fn summarize(outcomes: &[DuelOutcome], multiplier_a_vs_b: f32, multiplier_b_vs_a: f32) -> DuelReport {
    let count = |side: Winner| outcomes.iter().filter(|o| o.winner == Some(side)).count() as u64;
    let wins_a = count(Winner::SideA);
    let wins_b = count(Winner::SideB);
    let runs = outcomes.len() as u64;
    let decided: Vec<f32> = outcomes
        .iter()
        .filter(|o| o.winner.is_some())
        .map(|o| o.duration)
        .collect();
    let mean_time_to_kill = if decided.is_empty() {
        0.0
    } else {
        decided.iter().sum::<f32>() / decided.len() as f32
    };

    DuelReport {
        runs,
        wins_a,
        wins_b,
        draws: runs - wins_a - wins_b,
        win_rate_a: if runs == 0 { 0.0 } else { wins_a as f32 / runs as f32 },
        mean_time_to_kill,
        multiplier_a_vs_b,
        multiplier_b_vs_a,
    }
}
