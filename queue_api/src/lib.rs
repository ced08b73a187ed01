//! Boundary contracts between the empire AI and the engine-owned production
//! queue.
//!
//! The engine retains sole authority over what is actually under construction;
//! this crate defines the element rows, command surface and ownership data the
//! scheduling layer in `queue_core` is allowed to see, plus a headless
//! in-memory queue used by tests and harnesses.

mod element;
mod headless;
mod interface;

pub use element::{BuildKind, BuildTarget, DesignId, PlanetId, ProductionElement};
pub use headless::HeadlessQueue;
pub use interface::{AuthoritativeQueue, OwnershipSnapshot};
