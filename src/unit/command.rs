use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{Order, UnitId};

/// Player-issued command, validated at the simulation boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    MoveTo(Vec2),
    AttackMove(Vec2),
    Attack(UnitId),
    Patrol(Vec<Vec2>),
    Stop,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveTo(_) => "move_to",
            Self::AttackMove(_) => "attack_move",
            Self::Attack(_) => "attack",
            Self::Patrol(_) => "patrol",
            Self::Stop => "stop",
        }
    }

    /// Standing order this command installs
    pub fn into_order(self) -> Order {
        match self {
            Self::MoveTo(pos) => Order::Move(pos),
            Self::AttackMove(pos) => Order::AttackMove(pos),
            Self::Attack(target) => Order::Attack(target),
            Self::Patrol(waypoints) => Order::Patrol {
                waypoints,
                index: 0,
            },
            Self::Stop => Order::None,
        }
    }
}
