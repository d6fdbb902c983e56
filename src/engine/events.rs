//! Outbound notifications for presentation layers.
//!
//! The simulation never calls into rendering or audio; it queues
//! [`SimEvent`]s in the order they happen and hosts drain them after a tick.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::stats::{DamageClass, TemplateId};
use crate::unit::{PlayerId, UnitId, UnitState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Spawned {
        unit: UnitId,
        owner: PlayerId,
        template: TemplateId,
        position: Vec2,
    },
    StateChanged {
        unit: UnitId,
        old: UnitState,
        new: UnitState,
    },
    Damaged {
        unit: UnitId,
        amount: f32,
        damage_class: DamageClass,
        source: Option<UnitId>,
    },
    Death {
        unit: UnitId,
        killer: Option<UnitId>,
    },
    HeroLevelUp {
        unit: UnitId,
        level: u32,
    },
    /// Corpse left the registry after its grace period
    Removed { unit: UnitId },
}

impl SimEvent {
    /// Unit the event is about
    pub fn unit(&self) -> UnitId {
        match self {
            Self::Spawned { unit, .. }
            | Self::StateChanged { unit, .. }
            | Self::Damaged { unit, .. }
            | Self::Death { unit, .. }
            | Self::HeroLevelUp { unit, .. }
            | Self::Removed { unit } => *unit,
        }
    }
}

/// FIFO of events raised since the last drain
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn peek(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_in_order() {
        let mut queue = EventQueue::default();
        queue.push(SimEvent::Death {
            unit: UnitId(3),
            killer: None,
        });
        queue.push(SimEvent::Removed { unit: UnitId(3) });
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], SimEvent::Death { .. }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_json_roundtrip() {
        let event = SimEvent::Damaged {
            unit: UnitId(1),
            amount: 10.5,
            damage_class: DamageClass::Siege,
            source: Some(UnitId(2)),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.unit(), UnitId(1));
    }
}
