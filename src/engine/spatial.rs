//! Read-only spatial view of the registry, captured once per tick.
//!
//! Every unit plans against the same snapshot, so nothing observes another
//! unit's mid-tick mutation. Queries scan linearly in id order; ties are
//! broken by the lower id to keep results deterministic.

use bevy::math::Vec2;

use crate::unit::{PlayerId, Unit, UnitId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: PlayerId,
    pub position: Vec2,
    pub alive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Sorted by id
    views: Vec<UnitView>,
}

impl Snapshot {
    /// Capture from units iterated in ascending id order
    pub fn capture<'a>(units: impl IntoIterator<Item = &'a Unit>) -> Self {
        let views = units
            .into_iter()
            .map(|unit| UnitView {
                id: unit.id(),
                owner: unit.stats.owner,
                position: unit.stats.position,
                alive: unit.is_alive(),
            })
            .collect();
        Self { views }
    }

    pub fn get(&self, id: UnitId) -> Option<&UnitView> {
        self.views
            .binary_search_by_key(&id, |view| view.id)
            .ok()
            .map(|idx| &self.views[idx])
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Living hostiles of `owner` within `range` of `origin`
    pub fn hostiles_within(
        &self,
        owner: PlayerId,
        origin: Vec2,
        range: f32,
    ) -> impl Iterator<Item = &UnitView> + '_ {
        let range_sq = range * range;
        self.views.iter().filter(move |view| {
            view.alive
                && owner.is_hostile_to(view.owner)
                && view.position.distance_squared(origin) <= range_sq
        })
    }

    /// Closest living hostile within `range`
    pub fn nearest_hostile(&self, owner: PlayerId, origin: Vec2, range: f32) -> Option<UnitView> {
        let mut best: Option<(f32, UnitView)> = None;
        for view in self.hostiles_within(owner, origin, range) {
            let dist_sq = view.position.distance_squared(origin);
            // Strict comparison keeps the lower id on ties.
            if best.is_none_or(|(best_sq, _)| dist_sq < best_sq) {
                best = Some((dist_sq, *view));
            }
        }
        best.map(|(_, view)| view)
    }

    /// Normalized sum of unit vectors pointing away from every hostile in
    /// `range`. `None` when no hostile is in range or the pushes cancel out.
    pub fn flee_direction(&self, owner: PlayerId, origin: Vec2, range: f32) -> Option<Vec2> {
        let sum: Vec2 = self
            .hostiles_within(owner, origin, range)
            .map(|view| (origin - view.position).normalize_or_zero())
            .sum();
        let direction = sum.normalize_or_zero();
        (direction != Vec2::ZERO).then_some(direction)
    }
}
