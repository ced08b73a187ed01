use std::collections::{BTreeSet, HashMap};

use crate::element::{BuildTarget, DesignId, PlanetId, ProductionElement};
use crate::interface::AuthoritativeQueue;

/// Canonical location key for cost entries of location-invariant targets.
const CANONICAL_COST_LOCATION: PlanetId = PlanetId(-1);

/// In-memory stand-in for the engine-owned production queue.
///
/// Used by tests and headless harnesses to script engine behaviour: per-target
/// cost tables, creation rejection, reorder/removal refusal, engine-side
/// completion and foreign (pre-conquest) queue rows.
#[derive(Debug, Clone, Default)]
pub struct HeadlessQueue {
    elements: Vec<ProductionElement>,
    costs: HashMap<(BuildTarget, PlanetId), (f64, i32)>,
    default_cost: (f64, i32),
    location_invariant: BTreeSet<BuildTarget>,
    valid_locations: Option<BTreeSet<PlanetId>>,
    reject_creations: bool,
    fail_reorders: bool,
    fail_removals: bool,
}

impl HeadlessQueue {
    pub fn new() -> Self {
        Self {
            default_cost: (100.0, 5),
            ..Self::default()
        }
    }

    /// Cost and build time for `target` at `location`; pass `None` to set the
    /// canonical entry used for location-invariant targets.
    pub fn set_cost(
        &mut self,
        target: BuildTarget,
        location: Option<PlanetId>,
        cost: f64,
        turns: i32,
    ) {
        let key_location = location.unwrap_or(CANONICAL_COST_LOCATION);
        self.costs.insert((target, key_location), (cost, turns));
    }

    pub fn set_default_cost(&mut self, cost: f64, turns: i32) {
        self.default_cost = (cost, turns);
    }

    pub fn mark_location_invariant(&mut self, target: BuildTarget) {
        self.location_invariant.insert(target);
    }

    /// Restrict creation commands to the given locations; anything else is
    /// rejected, as the engine rejects invalid build sites.
    pub fn restrict_locations(&mut self, locations: impl IntoIterator<Item = PlanetId>) {
        self.valid_locations = Some(locations.into_iter().collect());
    }

    pub fn reject_creations(&mut self, reject: bool) {
        self.reject_creations = reject;
    }

    pub fn fail_reorders(&mut self, fail: bool) {
        self.fail_reorders = fail;
    }

    pub fn fail_removals(&mut self, fail: bool) {
        self.fail_removals = fail;
    }

    /// Engine-side insertion of an existing row, e.g. the build queue found on
    /// a conquered planet. Bypasses the creation command checks.
    pub fn insert_element(&mut self, index: usize, element: ProductionElement) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
    }

    pub fn push_element(&mut self, element: ProductionElement) {
        self.elements.push(element);
    }

    /// Engine-side removal of a completed (or invalidated) element, as happens
    /// between turns.
    pub fn complete(&mut self, index: usize) -> Option<ProductionElement> {
        if index < self.elements.len() {
            Some(self.elements.remove(index))
        } else {
            None
        }
    }

    /// Accumulate production points on the element at `index`.
    pub fn add_progress(&mut self, index: usize, points: f64) {
        if let Some(element) = self.elements.get_mut(index) {
            element.progress += points;
        }
    }

    pub fn elements(&self) -> &[ProductionElement] {
        &self.elements
    }

    fn location_allowed(&self, location: PlanetId) -> bool {
        match &self.valid_locations {
            Some(valid) => valid.contains(&location),
            None => true,
        }
    }

    fn create(&mut self, target: BuildTarget, location: PlanetId) -> bool {
        if self.reject_creations || !self.location_allowed(location) {
            tracing::debug!(
                target: "empire_ai::headless",
                item = %target,
                %location,
                "create.rejected"
            );
            return false;
        }
        self.elements
            .push(ProductionElement::new_order(target, location));
        true
    }
}

impl AuthoritativeQueue for HeadlessQueue {
    fn len(&self) -> usize {
        self.elements.len()
    }

    fn element(&self, index: usize) -> Option<ProductionElement> {
        self.elements.get(index).cloned()
    }

    fn create_building_order(&mut self, name: &str, location: PlanetId) -> bool {
        self.create(BuildTarget::building(name), location)
    }

    fn create_ship_order(&mut self, design: DesignId, location: PlanetId) -> bool {
        self.create(BuildTarget::ship(design), location)
    }

    fn reorder(&mut self, old_index: usize, new_index: usize) -> bool {
        if self.fail_reorders || old_index >= self.elements.len() {
            return false;
        }
        let element = self.elements.remove(old_index);
        if new_index > self.elements.len() {
            self.elements.insert(old_index, element);
            return false;
        }
        self.elements.insert(new_index, element);
        true
    }

    fn remove(&mut self, index: usize) -> bool {
        if self.fail_removals || index >= self.elements.len() {
            return false;
        }
        self.elements.remove(index);
        true
    }

    fn change_quantity(&mut self, index: usize, quantity: i32) -> bool {
        match self.elements.get_mut(index) {
            Some(element) if quantity > 0 => {
                element.blocksize = quantity;
                element.remaining = quantity;
                true
            }
            _ => false,
        }
    }

    fn cost_and_time(&self, element: &ProductionElement) -> (f64, i32) {
        let by_location = self
            .costs
            .get(&(element.target.clone(), element.location))
            .copied();
        by_location
            .or_else(|| {
                self.costs
                    .get(&(element.target.clone(), CANONICAL_COST_LOCATION))
                    .copied()
            })
            .unwrap_or(self.default_cost)
    }

    fn cost_invariant_to_location(&self, target: &BuildTarget) -> bool {
        self.location_invariant.contains(target)
    }
}
