//! Per-unit planning for one tick.
//!
//! [`plan`] reads a unit and the tick [`Snapshot`] and returns a [`UnitPlan`]:
//! the unit's next runtime record, position and any hits that land this tick.
//! Nothing here mutates the registry; the engine applies plans in id order.
//!
//! Priority each tick: swing bookkeeping, then the flee check, then the
//! behaviour of the current state.

use bevy::math::Vec2;

use crate::combat::AttackProfile;
use crate::engine::config::SimConfig;
use crate::engine::spatial::Snapshot;

use super::{Order, Swing, Unit, UnitId, UnitRuntime, UnitState};

/// Tick inputs shared by every unit
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    /// Simulation time at the end of this tick
    pub now: f64,
    pub dt: f32,
    pub config: &'a SimConfig,
    pub snapshot: &'a Snapshot,
}

/// A hit landing this tick, resolved by the engine with the shared RNG
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub attacker: UnitId,
    pub target: UnitId,
    pub attack: AttackProfile,
}

/// Outcome of planning one unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPlan {
    pub unit: UnitId,
    pub runtime: UnitRuntime,
    pub position: Vec2,
    pub impacts: Vec<Impact>,
}

impl UnitPlan {
    pub fn state(&self) -> UnitState {
        self.runtime.state
    }
}

/// Plan one living unit. Dead units keep their record untouched.
pub fn plan(unit: &Unit, ctx: &PlanContext<'_>) -> UnitPlan {
    let mut planner = Planner {
        unit,
        ctx,
        rt: unit.runtime.clone(),
        position: unit.stats.position,
        impacts: Vec::new(),
    };

    if unit.is_alive() {
        planner.advance_swing();
        planner.check_flee();
        planner.run_state();
    }

    UnitPlan {
        unit: unit.id(),
        runtime: planner.rt,
        position: planner.position,
        impacts: planner.impacts,
    }
}

/// Step `from` toward `goal` by at most `max_step`, stopping exactly on it
pub fn step_toward(from: Vec2, goal: Vec2, max_step: f32) -> Vec2 {
    let offset = goal - from;
    let dist = offset.length();
    if dist <= max_step || dist <= f32::EPSILON {
        goal
    } else {
        from + offset / dist * max_step.max(0.0)
    }
}

struct Planner<'u, 'c> {
    unit: &'u Unit,
    ctx: &'c PlanContext<'c>,
    rt: UnitRuntime,
    position: Vec2,
    impacts: Vec<Impact>,
}

impl Planner<'_, '_> {
    fn now(&self) -> f64 {
        self.ctx.now
    }

    fn step_len(&self) -> f32 {
        self.unit.stats.move_speed.max(0.0) * self.ctx.dt
    }

    /// Land a swing whose cast point has passed, retire it after backswing.
    /// Runs whatever the current state is: a swing past its cast point
    /// always completes.
    fn advance_swing(&mut self) {
        let Some(mut swing) = self.rt.swing else {
            return;
        };
        if !swing.landed && self.now() >= swing.impact_at {
            swing.landed = true;
            let target_alive = self
                .ctx
                .snapshot
                .get(swing.target)
                .is_some_and(|view| view.alive);
            if target_alive {
                self.impacts.push(Impact {
                    attacker: self.unit.id(),
                    target: swing.target,
                    attack: self.unit.stats.attack_profile(),
                });
            }
        }
        self.rt.swing = if swing.landed && self.now() >= swing.recovers_at {
            None
        } else {
            Some(swing)
        };
    }

    fn check_flee(&mut self) {
        if self.rt.state == UnitState::Fleeing {
            if self.unit.recovered_from_flee(self.ctx.config.flee_recovery_factor) {
                tracing::debug!(unit = %self.unit.id(), "recovered from flee");
                self.rt.destination = None;
                self.rt.state = UnitState::Idle;
            }
            return;
        }
        if !self.unit.wants_to_flee() {
            return;
        }
        self.rt.cancel_pending_swing(self.now());
        self.rt.order = Order::None;
        self.rt.resume = None;
        self.rt.target = None;
        self.rt.target_acquired = false;
        self.rt.state = UnitState::Fleeing;
        self.repath_flee();
    }

    fn run_state(&mut self) {
        match self.rt.state {
            UnitState::Idle => self.run_idle(),
            UnitState::Moving => self.run_moving(),
            UnitState::Patrolling => self.run_patrol(),
            UnitState::Attacking => self.run_attacking(),
            UnitState::Fleeing => self.run_fleeing(),
            UnitState::Dead => {}
        }
    }

    // ===== Fleeing =====

    fn repath_flee(&mut self) {
        let stats = &self.unit.stats;
        let direction =
            self.ctx
                .snapshot
                .flee_direction(stats.owner, self.position, stats.sight_range);
        // No visible threat: hold position.
        self.rt.destination = Some(match direction {
            Some(dir) => self.position + dir * self.ctx.config.flee_distance,
            None => self.position,
        });
        self.rt.next_flee_repath = self.now() + f64::from(self.ctx.config.flee_repath_interval);
    }

    fn run_fleeing(&mut self) {
        if self.now() >= self.rt.next_flee_repath {
            self.repath_flee();
        }
        if let Some(dest) = self.rt.destination {
            self.position = step_toward(self.position, dest, self.step_len());
        }
    }

    // ===== Acquisition =====

    fn try_acquire(&mut self) -> bool {
        let stats = &self.unit.stats;
        if stats.is_worker {
            return false;
        }
        let Some(found) =
            self.ctx
                .snapshot
                .nearest_hostile(stats.owner, self.position, stats.acquisition_range)
        else {
            return false;
        };

        let interrupted = std::mem::take(&mut self.rt.order);
        self.rt.resume = interrupted.resumes_after_combat().then_some(interrupted);
        self.rt.target = Some(found.id);
        self.rt.target_acquired = true;
        self.rt.destination = None;
        self.rt.state = UnitState::Attacking;
        tracing::debug!(unit = %self.unit.id(), target = %found.id, "acquired target");
        self.run_attacking();
        true
    }

    // ===== Idle / Moving / Patrolling =====

    fn run_idle(&mut self) {
        self.try_acquire();
    }

    fn run_moving(&mut self) {
        let dest = match self.rt.order {
            Order::Move(dest) => dest,
            Order::AttackMove(dest) => {
                if self.try_acquire() {
                    return;
                }
                dest
            }
            _ => {
                self.rt.destination = None;
                self.rt.state = UnitState::Idle;
                return;
            }
        };
        self.rt.destination = Some(dest);
        self.position = step_toward(self.position, dest, self.step_len());
        if self.position.distance(dest) <= self.ctx.config.arrive_epsilon {
            self.rt.order = Order::None;
            self.rt.destination = None;
            self.rt.state = UnitState::Idle;
        }
    }

    fn run_patrol(&mut self) {
        if self.try_acquire() {
            return;
        }
        let Order::Patrol { waypoints, index } = &mut self.rt.order else {
            self.rt.state = UnitState::Idle;
            return;
        };
        if waypoints.is_empty() {
            self.rt.order = Order::None;
            self.rt.state = UnitState::Idle;
            return;
        }
        let goal = waypoints[*index % waypoints.len()];
        let step = self.unit.stats.move_speed.max(0.0) * self.ctx.dt;
        self.position = step_toward(self.position, goal, step);
        if self.position.distance(goal) <= self.ctx.config.arrive_epsilon {
            *index = (*index + 1) % waypoints.len();
        }
        let next = waypoints[*index];
        self.rt.destination = Some(next);
    }

    // ===== Attacking =====

    fn run_attacking(&mut self) {
        let Some(target_id) = self.rt.target else {
            self.disengage();
            return;
        };
        let target = match self.ctx.snapshot.get(target_id) {
            Some(view) if view.alive => *view,
            _ => {
                self.disengage();
                return;
            }
        };

        let stats = &self.unit.stats;
        let distance = self.position.distance(target.position);
        if self.rt.target_acquired {
            let leash = stats.acquisition_range.max(stats.attack_range) + self.ctx.config.target_leash;
            if distance > leash {
                tracing::debug!(unit = %self.unit.id(), target = %target_id, "target beyond leash");
                self.disengage();
                return;
            }
        }

        if distance <= stats.attack_range {
            self.rt.destination = None;
            self.try_start_swing(target_id);
            return;
        }

        // Hold still while winding up; the swing lands on whoever it started on.
        if self.rt.swing.is_some_and(|swing| !swing.landed) {
            return;
        }
        self.rt.destination = Some(target.position);
        let max_step = self.step_len().min(distance - stats.attack_range);
        self.position = step_toward(self.position, target.position, max_step);
    }

    fn try_start_swing(&mut self, target: UnitId) {
        if self.rt.swing.is_some() {
            return;
        }
        let stats = &self.unit.stats;
        let now = self.now();
        let cooled = self
            .rt
            .last_attack_time
            .is_none_or(|last| now - last >= f64::from(stats.attack_cooldown));
        if !cooled {
            return;
        }

        let cast_point = f64::from(stats.cast_point.max(0.0));
        self.rt.swing = Some(Swing {
            target,
            started_at: now,
            impact_at: now + cast_point,
            recovers_at: now + cast_point + f64::from(stats.backswing.max(0.0)),
            landed: false,
            previous_attack_time: self.rt.last_attack_time,
        });
        self.rt.last_attack_time = Some(now);
        // Zero cast point lands on the same tick.
        self.advance_swing();
    }

    /// Drop the target and fall back to the interrupted order, or Idle
    fn disengage(&mut self) {
        self.rt.target = None;
        self.rt.target_acquired = false;
        self.rt.destination = None;
        match self.rt.resume.take() {
            Some(order @ Order::AttackMove(dest)) => {
                self.rt.destination = Some(dest);
                self.rt.order = order;
                self.rt.state = UnitState::Moving;
            }
            Some(order @ Order::Patrol { .. }) => {
                self.rt.order = order;
                self.rt.state = UnitState::Patrolling;
            }
            _ => {
                self.rt.order = Order::None;
                self.rt.state = UnitState::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{StatsModel, UnitStats};
    use crate::unit::PlayerId;

    fn unit(id: u32, owner: u8, template: &str, x: f32) -> Unit {
        let model = StatsModel::builtin();
        let template = model.get(template).unwrap();
        Unit {
            stats: UnitStats::from_template(
                UnitId(id),
                PlayerId(owner),
                Vec2::new(x, 0.0),
                template,
            ),
            runtime: UnitRuntime::default(),
            hero: None,
        }
    }

    fn plan_one(target: &Unit, all: &[&Unit], now: f64, dt: f32) -> UnitPlan {
        let config = SimConfig::default();
        let snapshot = Snapshot::capture(all.iter().copied());
        let ctx = PlanContext {
            now,
            dt,
            config: &config,
            snapshot: &snapshot,
        };
        plan(target, &ctx)
    }

    #[test]
    fn test_step_toward_clamps() {
        let to = step_toward(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0);
        assert_eq!(to, Vec2::new(4.0, 0.0));
        let to = step_toward(Vec2::ZERO, Vec2::new(3.0, 0.0), 4.0);
        assert_eq!(to, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_idle_acquires_hostile_in_range() {
        let a = unit(1, 1, "footman", 0.0);
        let b = unit(2, 2, "footman", 300.0);
        let plan = plan_one(&a, &[&a, &b], 0.1, 0.1);
        assert_eq!(plan.state(), UnitState::Attacking);
        assert_eq!(plan.runtime.target, Some(UnitId(2)));
        assert!(plan.runtime.target_acquired);
        assert!(plan.position.x > 0.0, "should close distance");
    }

    #[test]
    fn test_worker_never_acquires() {
        let a = unit(1, 1, "peasant", 0.0);
        let b = unit(2, 2, "footman", 50.0);
        let plan = plan_one(&a, &[&a, &b], 0.1, 0.1);
        assert_eq!(plan.state(), UnitState::Idle);
    }

    #[test]
    fn test_swing_lands_after_cast_point() {
        let mut a = unit(1, 1, "footman", 0.0);
        let b = unit(2, 2, "footman", 50.0);
        a.runtime.state = UnitState::Attacking;
        a.runtime.target = Some(UnitId(2));

        let first = plan_one(&a, &[&a, &b], 1.0, 0.1);
        assert!(first.impacts.is_empty());
        let swing = first.runtime.swing.unwrap();
        assert_eq!(swing.impact_at, 1.5);

        a.runtime = first.runtime;
        let landed = plan_one(&a, &[&a, &b], 1.5, 0.5);
        assert_eq!(landed.impacts.len(), 1);
        assert_eq!(landed.impacts[0].target, UnitId(2));
    }

    #[test]
    fn test_move_arrives_and_idles() {
        let mut a = unit(1, 1, "footman", 0.0);
        a.runtime.state = UnitState::Moving;
        a.runtime.order = Order::Move(Vec2::new(10.0, 0.0));
        let plan = plan_one(&a, &[&a], 1.0, 1.0);
        assert_eq!(plan.position, Vec2::new(10.0, 0.0));
        assert_eq!(plan.state(), UnitState::Idle);
        assert_eq!(plan.runtime.order, Order::None);
    }

    #[test]
    fn test_low_hp_flees_away_from_threat() {
        let mut a = unit(1, 1, "peasant", 0.0);
        a.stats.hp = a.stats.max_hp * 0.2;
        let b = unit(2, 2, "footman", 100.0);
        let plan = plan_one(&a, &[&a, &b], 0.1, 0.1);
        assert_eq!(plan.state(), UnitState::Fleeing);
        assert!(plan.runtime.destination.unwrap().x < 0.0);
        assert!(plan.position.x < 0.0);
    }
}
