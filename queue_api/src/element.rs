use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a planet in the engine's universe.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct PlanetId(pub i32);

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a ship design registered with the engine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct DesignId(pub i32);

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of a production order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildKind {
    Building,
    Ship,
}

/// What a production order builds: a building type by name or a ship design
/// by id.
///
/// Buildings and ships live in disjoint key domains; the derived ordering is
/// keyed by variant first, so a building never compares equal to (or
/// interleaves with) a ship even when the underlying values coincide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildTarget {
    Building(String),
    Ship(DesignId),
}

impl BuildTarget {
    pub fn building(name: impl Into<String>) -> Self {
        BuildTarget::Building(name.into())
    }

    pub fn ship(design: DesignId) -> Self {
        BuildTarget::Ship(design)
    }

    pub fn kind(&self) -> BuildKind {
        match self {
            BuildTarget::Building(_) => BuildKind::Building,
            BuildTarget::Ship(_) => BuildKind::Ship,
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildTarget::Building(name) => write!(f, "building {name}"),
            BuildTarget::Ship(design) => write!(f, "ship design {design}"),
        }
    }
}

/// One row of the engine-owned production queue, as exposed at the AI
/// boundary.
///
/// `progress` is accumulated production points, not a ratio; divide by the
/// total cost reported by the queue to obtain completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionElement {
    pub target: BuildTarget,
    pub location: PlanetId,
    pub progress: f64,
    pub allocation: f64,
    pub remaining: i32,
    pub blocksize: i32,
    pub turns_left: i32,
}

impl ProductionElement {
    /// Fresh order as the engine creates it when a creation command succeeds.
    pub fn new_order(target: BuildTarget, location: PlanetId) -> Self {
        Self {
            target,
            location,
            progress: 0.0,
            allocation: 0.0,
            remaining: 1,
            blocksize: 1,
            turns_left: -1,
        }
    }
}
