use std::cmp::Ordering;
use std::fmt;

use queue_api::{BuildTarget, PlanetId, ProductionElement};
use serde::{Deserialize, Serialize};

/// Production priority scale. Lower numeric value means higher precedence.
pub mod priority {
    /// Multiplier applied to a priority to force an order ahead of everything
    /// else while keeping its base rank recoverable.
    pub const EMERGENCY_FACTOR: f64 = 1e-9;
    pub const DEFAULT: f64 = 100.0;

    pub const BUILDING_LOW: f64 = 1000.0;
    pub const BUILDING_BASE: f64 = 100.0;
    pub const BUILDING_HIGH: f64 = 1.0;

    pub const SHIP_SCOUT: f64 = 100.0;
    pub const SHIP_ORBITAL_DEFENSE: f64 = 90.0;
    pub const SHIP_MIL: f64 = 80.0;
    pub const SHIP_OUTPOST: f64 = 70.0;
    pub const SHIP_COLO: f64 = 60.0;
    pub const SHIP_TROOPS: f64 = 50.0;
    pub const SHIP_ORBITAL_OUTPOST: f64 = 40.0;
    pub const SHIP_ORBITAL_COLO: f64 = 30.0;
    pub const SHIP_ORBITAL_TROOPS: f64 = 20.0;

    /// Base of the out-of-band range used for entries whose correct rank
    /// could not be established or enforced. Every value at or above this
    /// tail-sorts behind the whole normal range.
    pub const SENTINEL: f64 = 1e10;
}

/// One tracked order in the shadow queue: the engine's `(target, location)`
/// identity plus the priority metadata the engine does not store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueEntry {
    pub current_priority: f64,
    pub base_priority: f64,
    pub target: BuildTarget,
    pub location: PlanetId,
}

impl QueueEntry {
    /// Entry for a freshly confirmed order: current and base priority start
    /// equal.
    pub fn new(priority: f64, target: BuildTarget, location: PlanetId) -> Self {
        Self {
            current_priority: priority,
            base_priority: priority,
            target,
            location,
        }
    }

    /// Entry mirroring an authoritative element under a sentinel priority,
    /// used for orders discovered on conquered planets and for rows left
    /// unclassified by an aborted reconciliation pass.
    pub fn sentinel_from(element: &ProductionElement, sentinel_priority: f64) -> Self {
        Self {
            current_priority: sentinel_priority,
            base_priority: sentinel_priority,
            target: element.target.clone(),
            location: element.location,
        }
    }

    /// Whether this entry describes the same order as an authoritative row.
    pub fn matches_element(&self, element: &ProductionElement) -> bool {
        self.target == element.target && self.location == element.location
    }

    pub fn is_sentinel(&self) -> bool {
        self.current_priority >= priority::SENTINEL
    }

    /// Demote to a fresh sentinel priority, keeping the entry tracked while
    /// marking it for review.
    pub fn demote_to_sentinel(&mut self, sentinel_priority: f64) {
        self.current_priority = sentinel_priority;
        self.base_priority = sentinel_priority;
    }
}

impl fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at planet {} (priority {:.3}, base {:.3})",
            self.target, self.location, self.current_priority, self.base_priority
        )
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    /// Total, deterministic order: ascending current priority, then base
    /// priority, then target (kind first, never across kinds), then location.
    fn cmp(&self, other: &Self) -> Ordering {
        self.current_priority
            .total_cmp(&other.current_priority)
            .then_with(|| self.base_priority.total_cmp(&other.base_priority))
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| self.location.cmp(&other.location))
    }
}

/// Allocator of sentinel priorities.
///
/// Each demotion gets a strictly larger value, so demoted entries keep a
/// stable relative order among themselves and the running count survives
/// save/load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SentinelAllocator {
    issued: u64,
}

impl SentinelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted issue count.
    pub fn resume(issued: u64) -> Self {
        Self { issued }
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn next(&mut self) -> f64 {
        let value = priority::SENTINEL + self.issued as f64;
        self.issued += 1;
        value
    }
}
