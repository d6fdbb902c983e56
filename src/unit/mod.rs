//! Per-unit runtime records and the unit state machine.
//!
//! A [`Unit`] owns its mutable [`UnitStats`], its FSM bookkeeping
//! ([`UnitRuntime`]) and, for heroes, a [`HeroState`]. Units never touch each
//! other directly: targets are ids resolved through the registry every tick.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::progression::HeroState;
use crate::stats::UnitStats;

pub mod command;
pub mod fsm;

pub use command::Command;
pub use fsm::{Impact, UnitPlan};

/// Registry key of a spawned unit. Ids are never reused within a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owning player. Units of different owners are hostile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub fn is_hostile_to(self, other: PlayerId) -> bool {
        self != other
    }
}

/// FSM state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitState {
    #[default]
    Idle,
    Moving,
    Attacking,
    Patrolling,
    Fleeing,
    Dead,
}

/// Standing order the FSM executes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Order {
    #[default]
    None,
    Move(Vec2),
    /// Move, engaging anything met on the way
    AttackMove(Vec2),
    /// Explicit target: chased without leash
    Attack(UnitId),
    Patrol { waypoints: Vec<Vec2>, index: usize },
}

impl Order {
    /// Orders that auto-acquire and resume after the fight
    pub fn resumes_after_combat(&self) -> bool {
        matches!(self, Order::AttackMove(_) | Order::Patrol { .. })
    }
}

/// An attack in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    pub target: UnitId,
    pub started_at: f64,
    /// Impact time (start + cast point)
    pub impact_at: f64,
    /// Earliest next swing from this one (start + cast point + backswing)
    pub recovers_at: f64,
    pub landed: bool,
    /// `last_attack_time` before this swing began, restored on cancel
    pub previous_attack_time: Option<f64>,
}

impl Swing {
    pub fn past_cast_point(&self, now: f64) -> bool {
        self.landed || now >= self.impact_at
    }
}

/// FSM bookkeeping for one unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitRuntime {
    pub state: UnitState,
    pub order: Order,
    /// Order to resume once an auto-acquired fight ends
    pub resume: Option<Order>,
    /// Weak reference, resolved by id every tick
    pub target: Option<UnitId>,
    /// True when the target came from acquisition rather than a command
    pub target_acquired: bool,
    pub last_attack_time: Option<f64>,
    pub swing: Option<Swing>,
    pub destination: Option<Vec2>,
    pub next_flee_repath: f64,
    /// Simulation time of death
    pub died_at: Option<f64>,
}

impl UnitRuntime {
    /// Drop everything except the state itself
    pub fn clear(&mut self) {
        self.order = Order::None;
        self.resume = None;
        self.target = None;
        self.target_acquired = false;
        self.swing = None;
        self.destination = None;
        self.next_flee_repath = 0.0;
    }

    /// Cancel the pending swing if it has not reached its cast point.
    /// Returns true if a swing was cancelled.
    pub fn cancel_pending_swing(&mut self, now: f64) -> bool {
        match self.swing {
            Some(swing) if !swing.past_cast_point(now) => {
                self.last_attack_time = swing.previous_attack_time;
                self.swing = None;
                true
            }
            _ => false,
        }
    }
}

/// A live or dead unit in the registry
#[derive(Debug, Clone)]
pub struct Unit {
    pub stats: UnitStats,
    pub runtime: UnitRuntime,
    pub hero: Option<HeroState>,
}

impl Unit {
    pub fn id(&self) -> UnitId {
        self.stats.id
    }

    pub fn state(&self) -> UnitState {
        self.runtime.state
    }

    pub fn is_alive(&self) -> bool {
        self.runtime.state != UnitState::Dead && self.stats.is_alive()
    }

    /// Flee trigger: `can_flee && hp_fraction <= flee_health_percent`
    pub fn wants_to_flee(&self) -> bool {
        self.stats.can_flee
            && self.stats.flee_health_percent > 0.0
            && self.stats.hp_fraction() <= self.stats.flee_health_percent
    }

    /// Flee exit: hp fraction strictly above `factor * flee_health_percent`
    pub fn recovered_from_flee(&self, recovery_factor: f32) -> bool {
        self.stats.hp_fraction() > recovery_factor * self.stats.flee_health_percent
    }
}
