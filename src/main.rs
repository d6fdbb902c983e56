use anyhow::{Context, Result};
use bevy::prelude::*;
use bevy::time::{TimePlugin, TimeUpdateStrategy};
use std::time::Duration;

use skirmish_core::engine::{SimEventMessage, SimulationResource};
use skirmish_core::logging::LoggingPlugin;
use skirmish_core::{Command, PlayerId, SimConfig, SimEvent, SimulationPlugin};

const BLUE: PlayerId = PlayerId(1);
const RED: PlayerId = PlayerId(2);
const MAX_SECONDS: f32 = 90.0;

#[derive(Resource, Debug, Default)]
struct BattleLog {
    deaths: u32,
    level_ups: u32,
    damage_dealt: f32,
}

fn record_battle(mut reader: EventReader<SimEventMessage>, mut log: ResMut<BattleLog>) {
    for SimEventMessage(event) in reader.read() {
        match event {
            SimEvent::Death { .. } => log.deaths += 1,
            SimEvent::HeroLevelUp { unit, level } => {
                log.level_ups += 1;
                tracing::info!(unit = %unit, level, "hero reached new level");
            }
            SimEvent::Damaged { amount, .. } => log.damage_dealt += amount,
            _ => {}
        }
    }
}

fn deploy(app: &mut App) -> Result<()> {
    let mut res = app.world_mut().resource_mut::<SimulationResource>();
    let sim = &mut res.0;

    let mut blue = vec![sim.spawn("blademaster", BLUE, Vec2::new(0.0, 0.0))?];
    for i in 0..3 {
        blue.push(sim.spawn("footman", BLUE, Vec2::new(-80.0, i as f32 * 70.0 - 70.0))?);
    }
    let mut red = Vec::new();
    for i in 0..2 {
        red.push(sim.spawn("rifleman", RED, Vec2::new(1000.0, i as f32 * 90.0))?);
        red.push(sim.spawn("gnoll", RED, Vec2::new(900.0, i as f32 * 90.0 - 45.0))?);
    }

    for id in blue {
        sim.issue(id, Command::AttackMove(Vec2::new(1000.0, 0.0)))?;
    }
    for id in red {
        sim.issue(id, Command::AttackMove(Vec2::new(0.0, 0.0)))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            SimConfig::load(&path).with_context(|| format!("loading sim config from {path}"))?
        }
        None => SimConfig::default(),
    };
    let step = config.tick_duration();

    let mut app = App::new();
    app.add_plugins((LoggingPlugin, TimePlugin, SimulationPlugin::new(config)))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            step,
        )))
        .init_resource::<BattleLog>()
        .add_systems(Update, record_battle);
    app.finish();
    app.cleanup();

    deploy(&mut app).context("deploying armies")?;

    let max_frames = (MAX_SECONDS / step).ceil() as usize;
    for _ in 0..max_frames {
        app.update();
        let sim = &app.world().resource::<SimulationResource>().0;
        if sim.living_count(BLUE) == 0 || sim.living_count(RED) == 0 {
            break;
        }
    }

    let sim = &app.world().resource::<SimulationResource>().0;
    let log = app.world().resource::<BattleLog>();
    let winner = match (sim.living_count(BLUE), sim.living_count(RED)) {
        (0, 0) => "nobody",
        (_, 0) => "blue",
        (0, _) => "red",
        _ => "undecided",
    };
    tracing::info!(
        winner,
        seconds = sim.elapsed(),
        ticks = sim.tick_count(),
        deaths = log.deaths,
        level_ups = log.level_ups,
        damage = log.damage_dealt,
        digest = %format!("{:016x}", sim.state_digest()),
        "skirmish finished"
    );
    Ok(())
}
