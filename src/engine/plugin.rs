use bevy::prelude::*;
use std::sync::Arc;

use crate::combat::DamageMatrix;
use crate::engine::config::SimConfig;
use crate::engine::events::SimEvent;
use crate::engine::simulation::Simulation;
use crate::stats::StatsModel;

/// Runs a [`Simulation`] inside a bevy `App`, one tick per `Update`
#[derive(Debug, Clone, Default)]
pub struct SimulationPlugin {
    pub config: SimConfig,
    /// Built-in roster when `None`
    pub model: Option<Arc<StatsModel>>,
    /// Standard table when `None`
    pub matrix: Option<Arc<DamageMatrix>>,
}

impl SimulationPlugin {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: Arc<StatsModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_matrix(mut self, matrix: Arc<DamageMatrix>) -> Self {
        self.matrix = Some(matrix);
        self
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| Arc::new(StatsModel::builtin()));
        let matrix = self
            .matrix
            .clone()
            .unwrap_or_else(|| Arc::new(DamageMatrix::standard()));
        let simulation = Simulation::new(self.config.clone(), model, matrix);

        app.insert_resource(SimulationResource(simulation))
            .add_event::<SimEventMessage>()
            .add_systems(Update, simulation_tick_system);
    }
}

#[derive(Resource, Debug)]
pub struct SimulationResource(pub Simulation);

/// A drained [`SimEvent`] forwarded to bevy systems
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SimEventMessage(pub SimEvent);

fn simulation_tick_system(
    time: Res<Time>,
    mut sim: ResMut<SimulationResource>,
    mut events: EventWriter<SimEventMessage>,
) {
    sim.0.tick(time.delta_secs());
    for event in sim.0.drain_events() {
        events.send(SimEventMessage(event));
    }
}
