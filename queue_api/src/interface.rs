use std::collections::BTreeSet;

use crate::element::{BuildTarget, DesignId, PlanetId, ProductionElement};

/// The engine-owned production queue as seen by the scheduling layer.
///
/// The queue is an ordered, indexable sequence of [`ProductionElement`]s that
/// only the engine may annotate; the AI mutates it exclusively through the
/// narrow command set below. Commands are synchronous and report success as a
/// plain `bool`, mirroring the engine interface verbatim: a `false` return
/// means the engine refused the command and left the queue untouched.
pub trait AuthoritativeQueue {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element currently at `index`, or `None` past the end.
    fn element(&self, index: usize) -> Option<ProductionElement>;

    /// Ordered copy of the whole queue, taken at the start of a turn's
    /// reconciliation pass.
    fn snapshot(&self) -> Vec<ProductionElement> {
        (0..self.len()).filter_map(|i| self.element(i)).collect()
    }

    /// Append a building order at the tail. `false` on rejection (missing
    /// prerequisite, invalid location, unavailable technology).
    fn create_building_order(&mut self, name: &str, location: PlanetId) -> bool;

    /// Append a ship order at the tail. `false` on rejection (invalid design
    /// or location).
    fn create_ship_order(&mut self, design: DesignId, location: PlanetId) -> bool;

    /// Remove the element at `old_index` and reinsert it so that it occupies
    /// `new_index` in the resulting order. Positions, not entries, are
    /// addressed: every successful call shifts the indices of the elements in
    /// between.
    fn reorder(&mut self, old_index: usize, new_index: usize) -> bool;

    /// Remove the element at `index`.
    fn remove(&mut self, index: usize) -> bool;

    /// Change the build quantity of the element at `index`.
    fn change_quantity(&mut self, index: usize, quantity: i32) -> bool;

    /// Total cost and build time for an element. Turn-scoped: callers may
    /// cache the result for the rest of the turn, keyed by target and
    /// location (or a canonical location when
    /// [`cost_invariant_to_location`](Self::cost_invariant_to_location)
    /// holds).
    fn cost_and_time(&self, element: &ProductionElement) -> (f64, i32);

    /// Whether `target` costs the same everywhere, allowing a single cache
    /// slot under a canonical location.
    fn cost_invariant_to_location(&self, target: &BuildTarget) -> bool {
        let _ = target;
        false
    }
}

/// Planets owned by the empire this turn versus last turn.
///
/// Built once per turn from the engine's ownership data and consumed by the
/// reconciliation pass; not persisted beyond the turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnershipSnapshot {
    previous: BTreeSet<PlanetId>,
    current: BTreeSet<PlanetId>,
}

impl OwnershipSnapshot {
    pub fn new(
        previous: impl IntoIterator<Item = PlanetId>,
        current: impl IntoIterator<Item = PlanetId>,
    ) -> Self {
        Self {
            previous: previous.into_iter().collect(),
            current: current.into_iter().collect(),
        }
    }

    /// Ownership that has not changed since last turn.
    pub fn unchanged(owned: impl IntoIterator<Item = PlanetId>) -> Self {
        let current: BTreeSet<PlanetId> = owned.into_iter().collect();
        Self {
            previous: current.clone(),
            current,
        }
    }

    /// Planets owned last turn but not this turn.
    pub fn lost_planets(&self) -> BTreeSet<PlanetId> {
        self.previous.difference(&self.current).copied().collect()
    }

    /// Planets owned this turn but not last turn.
    pub fn gained_planets(&self) -> BTreeSet<PlanetId> {
        self.current.difference(&self.previous).copied().collect()
    }

    pub fn owns(&self, planet: PlanetId) -> bool {
        self.current.contains(&planet)
    }

    /// Roll the snapshot forward: this turn's holdings become last turn's.
    pub fn advance(self, current: impl IntoIterator<Item = PlanetId>) -> Self {
        Self {
            previous: self.current,
            current: current.into_iter().collect(),
        }
    }
}
