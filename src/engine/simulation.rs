use bevy::math::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::combat::{DamageMatrix, DamageResolver};
use crate::engine::config::SimConfig;
use crate::engine::events::{EventQueue, SimEvent};
use crate::engine::replay::{Replay, ReplayInput};
use crate::engine::spatial::Snapshot;
use crate::error::{CommandRejection, SpawnError, TargetRejection};
use crate::progression::HeroState;
use crate::stats::{DamageClass, StatsModel, UnitStats};
use crate::unit::fsm::{self, Impact, PlanContext, UnitPlan};
use crate::unit::{Command, PlayerId, Unit, UnitId, UnitRuntime, UnitState};

/// Simulation time bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Scaled simulation seconds since start
    pub elapsed: f64,
    pub tick: u64,
    pub time_scale: f32,
    pub paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            tick: 0,
            time_scale: 1.0,
            paused: false,
        }
    }
}

/// The world: unit registry, clock, shared RNG stream and event queue.
///
/// Driven by explicit [`Simulation::tick`] calls. Each tick plans every
/// living unit against one snapshot, then applies plans and hits in
/// ascending id order, so a given seed and input sequence always produces
/// the same run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    model: Arc<StatsModel>,
    resolver: DamageResolver,
    units: BTreeMap<UnitId, Unit>,
    next_id: u32,
    clock: SimClock,
    rng: Xoshiro256PlusPlus,
    events: EventQueue,
    recorder: Option<Replay>,
}

impl Simulation {
    pub fn new(config: SimConfig, model: Arc<StatsModel>, matrix: Arc<DamageMatrix>) -> Self {
        tracing::info!(seed = config.seed, templates = model.len(), "simulation created");
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(config.seed),
            resolver: DamageResolver::new(matrix),
            config,
            model,
            units: BTreeMap::new(),
            next_id: 1,
            clock: SimClock::default(),
            events: EventQueue::default(),
            recorder: None,
        }
    }

    /// Built-in roster and the standard damage table
    pub fn with_builtin(config: SimConfig) -> Self {
        Self::new(
            config,
            Arc::new(StatsModel::builtin()),
            Arc::new(DamageMatrix::standard()),
        )
    }

    /// Record every accepted input and tick from now on. Only a fresh
    /// simulation can be reproduced from its recording.
    pub fn with_recording(mut self) -> Self {
        self.recorder = Some(Replay::new(self.config.clone()));
        self
    }

    /// Stop recording and stamp the replay with the current digest
    pub fn finish_recording(&mut self) -> Option<Replay> {
        let digest = self.state_digest();
        self.recorder.take().map(|mut replay| {
            replay.final_digest = Some(digest);
            replay
        })
    }

    fn record(&mut self, input: impl FnOnce() -> ReplayInput) {
        if let Some(replay) = self.recorder.as_mut() {
            replay.push_input(input());
        }
    }

    // ===== Registry =====

    pub fn spawn(
        &mut self,
        template_id: &str,
        owner: PlayerId,
        position: Vec2,
    ) -> Result<UnitId, SpawnError> {
        let template = self
            .model
            .get(template_id)
            .cloned()
            .ok_or_else(|| SpawnError::UnknownTemplate(template_id.to_string()))?;
        let living = self.units.values().filter(|unit| unit.is_alive()).count();
        if living >= self.config.max_units {
            tracing::warn!(template = template_id, max = self.config.max_units, "spawn refused: capacity");
            return Err(SpawnError::CapacityExceeded(self.config.max_units));
        }

        let id = UnitId(self.next_id);
        self.next_id += 1;
        let mut stats = UnitStats::from_template(id, owner, position, &template);
        let hero = HeroState::new(Arc::clone(&template));
        if let Some(hero) = &hero {
            hero.derived().apply(&mut stats);
        }
        self.units.insert(
            id,
            Unit {
                stats,
                runtime: UnitRuntime::default(),
                hero,
            },
        );

        tracing::info!(unit = %id, template = template_id, owner = owner.0, "spawned");
        self.events.push(SimEvent::Spawned {
            unit: id,
            owner,
            template: template.id.clone(),
            position,
        });
        self.record(|| ReplayInput::Spawn {
            template: template_id.to_string(),
            owner,
            position,
        });
        Ok(id)
    }

    // ===== Commands =====

    /// Validate and apply a player command. A rejected command leaves the
    /// unit exactly as it was.
    pub fn issue(&mut self, id: UnitId, command: Command) -> Result<(), CommandRejection> {
        if let Err(rejection) = self.validate(id, &command) {
            tracing::warn!(unit = %id, command = command.name(), %rejection, "command rejected");
            return Err(rejection);
        }
        self.record(|| ReplayInput::Command {
            unit: id,
            command: command.clone(),
        });

        let now = self.clock.elapsed;
        let unit = self
            .units
            .get_mut(&id)
            .ok_or(CommandRejection::UnknownUnit(id))?;
        let old = unit.runtime.state;
        let rt = &mut unit.runtime;
        if rt.cancel_pending_swing(now) {
            tracing::debug!(unit = %id, "pending swing cancelled");
        }
        rt.resume = None;
        rt.target = None;
        rt.target_acquired = false;
        rt.destination = None;
        rt.state = match &command {
            Command::Stop => UnitState::Idle,
            Command::MoveTo(dest) | Command::AttackMove(dest) => {
                rt.destination = Some(*dest);
                UnitState::Moving
            }
            Command::Attack(target) => {
                rt.target = Some(*target);
                UnitState::Attacking
            }
            Command::Patrol(waypoints) => {
                rt.destination = waypoints.first().copied();
                UnitState::Patrolling
            }
        };
        tracing::debug!(unit = %id, command = command.name(), "command accepted");
        rt.order = command.into_order();

        let new = rt.state;
        if old != new {
            self.events.push(SimEvent::StateChanged { unit: id, old, new });
        }
        Ok(())
    }

    fn validate(&self, id: UnitId, command: &Command) -> Result<(), CommandRejection> {
        let unit = self
            .units
            .get(&id)
            .ok_or(CommandRejection::UnknownUnit(id))?;
        if !unit.is_alive() {
            return Err(CommandRejection::UnitDead(id));
        }
        match command {
            Command::Attack(target) => {
                let reason = if *target == id {
                    Some(TargetRejection::SelfTarget)
                } else {
                    match self.units.get(target) {
                        None => Some(TargetRejection::Missing(*target)),
                        Some(other) if !other.is_alive() => Some(TargetRejection::Dead(*target)),
                        Some(other) if !unit.stats.owner.is_hostile_to(other.stats.owner) => {
                            Some(TargetRejection::Ally(*target))
                        }
                        Some(_) => None,
                    }
                };
                match reason {
                    Some(reason) => Err(CommandRejection::InvalidTarget(reason)),
                    None => Ok(()),
                }
            }
            Command::Patrol(waypoints) if waypoints.len() < 2 => {
                Err(CommandRejection::PatrolTooShort(waypoints.len()))
            }
            _ => Ok(()),
        }
    }

    fn living(&self, id: UnitId) -> Result<&Unit, CommandRejection> {
        let unit = self
            .units
            .get(&id)
            .ok_or(CommandRejection::UnknownUnit(id))?;
        if unit.is_alive() {
            Ok(unit)
        } else {
            Err(CommandRejection::UnitDead(id))
        }
    }

    /// Apply already-resolved damage from outside the attack loop (spells,
    /// scripted effects). Returns the HP actually removed.
    pub fn apply_damage(
        &mut self,
        target: UnitId,
        amount: f32,
        damage_class: DamageClass,
        source: Option<UnitId>,
    ) -> Result<f32, CommandRejection> {
        self.living(target)?;
        self.record(|| ReplayInput::Damage {
            unit: target,
            amount,
            damage_class,
            source,
        });
        Ok(self.deal(target, amount, damage_class, source))
    }

    /// Restore HP on a living unit. Returns the HP actually restored.
    pub fn heal(&mut self, target: UnitId, amount: f32) -> Result<f32, CommandRejection> {
        self.living(target)?;
        self.record(|| ReplayInput::Heal {
            unit: target,
            amount,
        });
        let unit = self
            .units
            .get_mut(&target)
            .ok_or(CommandRejection::UnknownUnit(target))?;
        Ok(unit.stats.heal(amount))
    }

    /// Spend a skill point on a hero ability slot; returns the new level
    pub fn invest_ability(&mut self, id: UnitId, slot: usize) -> Result<u32, CommandRejection> {
        self.living(id)?;
        let unit = self
            .units
            .get_mut(&id)
            .ok_or(CommandRejection::UnknownUnit(id))?;
        let hero = unit.hero.as_mut().ok_or(CommandRejection::NotAHero(id))?;
        let level = hero.invest(slot).inspect_err(|err| {
            tracing::warn!(unit = %id, slot, %err, "ability investment rejected");
        })?;
        tracing::debug!(unit = %id, slot, level, "ability invested");
        self.record(|| ReplayInput::Invest { unit: id, slot });
        Ok(level)
    }

    // ===== Time =====

    /// Scale applied to every `tick` delta. Negative or NaN is ignored.
    pub fn set_time_scale(&mut self, scale: f32) {
        if scale >= 0.0 {
            self.clock.time_scale = scale;
        }
    }

    pub fn pause(&mut self) {
        self.clock.paused = true;
    }

    pub fn resume(&mut self) {
        self.clock.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.clock.paused
    }

    /// Advance the world by `dt` real seconds
    pub fn tick(&mut self, dt: f32) {
        if self.clock.paused {
            return;
        }
        let dt = dt * self.clock.time_scale;
        if !(dt > 0.0) {
            return;
        }
        if let Some(replay) = self.recorder.as_mut() {
            replay.push_tick(dt);
        }

        self.clock.elapsed += f64::from(dt);
        self.clock.tick += 1;
        let now = self.clock.elapsed;

        let plans: Vec<UnitPlan> = {
            let snapshot = Snapshot::capture(self.units.values());
            let ctx = PlanContext {
                now,
                dt,
                config: &self.config,
                snapshot: &snapshot,
            };
            self.units
                .values()
                .filter(|unit| unit.is_alive())
                .map(|unit| fsm::plan(unit, &ctx))
                .collect()
        };

        let mut impacts: Vec<Impact> = Vec::new();
        for plan in plans {
            let Some(unit) = self.units.get_mut(&plan.unit) else {
                continue;
            };
            let old = unit.runtime.state;
            unit.runtime = plan.runtime;
            unit.stats.position = plan.position;
            unit.stats.regenerate(dt);
            let new = unit.runtime.state;
            if old != new {
                tracing::debug!(unit = %plan.unit, ?old, ?new, "state changed");
                self.events.push(SimEvent::StateChanged {
                    unit: plan.unit,
                    old,
                    new,
                });
            }
            impacts.extend(plan.impacts);
        }

        for impact in impacts {
            self.land(impact);
        }
        self.remove_corpses(now);
    }

    // ===== Combat =====

    fn land(&mut self, impact: Impact) {
        let defense = match self.units.get(&impact.target) {
            Some(target) if target.is_alive() => target.stats.defense_profile(),
            // Killed earlier this tick.
            _ => return,
        };
        let outcome = self
            .resolver
            .resolve(&impact.attack, &defense, &mut self.rng);
        self.deal(
            impact.target,
            outcome.effective_damage,
            impact.attack.damage_class,
            Some(impact.attacker),
        );
    }

    fn deal(
        &mut self,
        target: UnitId,
        amount: f32,
        damage_class: DamageClass,
        source: Option<UnitId>,
    ) -> f32 {
        let Some(unit) = self.units.get_mut(&target) else {
            return 0.0;
        };
        if !unit.is_alive() {
            return 0.0;
        }
        let applied = unit.stats.take_damage(amount);
        let died = !unit.stats.is_alive();
        self.events.push(SimEvent::Damaged {
            unit: target,
            amount: applied,
            damage_class,
            source,
        });
        if died {
            self.kill(target, source);
        }
        applied
    }

    fn kill(&mut self, id: UnitId, killer: Option<UnitId>) {
        let now = self.clock.elapsed;
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let old = unit.runtime.state;
        unit.runtime.clear();
        unit.runtime.state = UnitState::Dead;
        unit.runtime.died_at = Some(now);
        unit.stats.hp = 0.0;
        let (owner, position, bounty) = (unit.stats.owner, unit.stats.position, unit.stats.xp_bounty);

        tracing::info!(unit = %id, killer = ?killer, "unit died");
        if old != UnitState::Dead {
            self.events.push(SimEvent::StateChanged {
                unit: id,
                old,
                new: UnitState::Dead,
            });
        }
        self.events.push(SimEvent::Death { unit: id, killer });
        self.award_bounty(owner, position, bounty, killer);
    }

    /// Split a kill's XP bounty between the killer owner's living heroes
    /// near the victim
    fn award_bounty(&mut self, victim_owner: PlayerId, at: Vec2, bounty: u32, killer: Option<UnitId>) {
        let Some(killer_owner) = killer
            .and_then(|id| self.units.get(&id))
            .map(|unit| unit.stats.owner)
        else {
            return;
        };
        if bounty == 0 || !killer_owner.is_hostile_to(victim_owner) {
            return;
        }
        let range_sq = self.config.hero_xp_range * self.config.hero_xp_range;
        let heroes: Vec<UnitId> = self
            .units
            .values()
            .filter(|unit| {
                unit.hero.is_some()
                    && unit.is_alive()
                    && unit.stats.owner == killer_owner
                    && unit.stats.position.distance_squared(at) <= range_sq
            })
            .map(Unit::id)
            .collect();
        if heroes.is_empty() {
            return;
        }

        let share = bounty / heroes.len() as u32;
        for id in heroes {
            let Some(unit) = self.units.get_mut(&id) else {
                continue;
            };
            let Some(hero) = unit.hero.as_mut() else {
                continue;
            };
            if hero.add_xp(share) == 0 {
                continue;
            }
            hero.derived().apply(&mut unit.stats);
            let level = hero.level;
            tracing::info!(unit = %id, level, "hero level up");
            self.events.push(SimEvent::HeroLevelUp { unit: id, level });
        }
    }

    fn remove_corpses(&mut self, now: f64) {
        let grace = f64::from(self.config.corpse_grace_period);
        let expired: Vec<UnitId> = self
            .units
            .values()
            .filter(|unit| unit.runtime.died_at.is_some_and(|died| now - died >= grace))
            .map(Unit::id)
            .collect();
        for id in expired {
            self.units.remove(&id);
            tracing::debug!(unit = %id, "corpse removed");
            self.events.push(SimEvent::Removed { unit: id });
        }
    }

    // ===== Queries =====

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// All registry entries, corpses included, in id order
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn current_hp(&self, id: UnitId) -> Option<f32> {
        self.unit(id).map(|unit| unit.stats.hp)
    }

    pub fn current_state(&self, id: UnitId) -> Option<UnitState> {
        self.unit(id).map(Unit::state)
    }

    pub fn hp_fraction(&self, id: UnitId) -> Option<f32> {
        self.unit(id).map(|unit| unit.stats.hp_fraction())
    }

    pub fn position(&self, id: UnitId) -> Option<Vec2> {
        self.unit(id).map(|unit| unit.stats.position)
    }

    pub fn living_count(&self, owner: PlayerId) -> usize {
        self.units
            .values()
            .filter(|unit| unit.is_alive() && unit.stats.owner == owner)
            .count()
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.tick
    }

    pub fn clock(&self) -> SimClock {
        self.clock
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn model(&self) -> &Arc<StatsModel> {
        &self.model
    }

    pub fn resolver(&self) -> &DamageResolver {
        &self.resolver
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &[SimEvent] {
        self.events.peek()
    }

    /// Hash of everything that evolves during a run. Equal digests after
    /// equal inputs is the determinism contract.
    pub fn state_digest(&self) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(self.clock.tick.to_le_bytes());
        hasher.update(self.clock.elapsed.to_bits().to_le_bytes());
        for unit in self.units.values() {
            hasher.update(unit.id().0.to_le_bytes());
            hasher.update([unit.state() as u8]);
            hasher.update(unit.stats.position.x.to_bits().to_le_bytes());
            hasher.update(unit.stats.position.y.to_bits().to_le_bytes());
            hasher.update(unit.stats.hp.to_bits().to_le_bytes());
            hasher.update(unit.stats.mana.to_bits().to_le_bytes());
            let target = unit.runtime.target.map_or(u32::MAX, |t| t.0);
            hasher.update(target.to_le_bytes());
            if let Some(hero) = &unit.hero {
                hasher.update(hero.xp.to_le_bytes());
            }
        }
        super::digest_to_u64(&hasher.finalize())
    }
}
