//! Production-queue priority synchronization for the empire AI.
//!
//! The engine owns the build queue and exposes only a narrow command set
//! (create, reorder, remove) with no room for annotations or history. This
//! crate keeps a priority-annotated mirror of that queue, reconstructs what
//! happened between turns — completions, losses, conquests — purely from
//! positional correspondence, and re-imposes its priority order with minimal
//! reorder commands. All mutation of the authoritative queue flows through
//! [`ProductionScheduler`]; anything else desynchronizes the mirror.

mod entry;
mod reconcile;
mod save;
mod schedule;
mod scheduler;
mod shadow;

pub use entry::{priority, QueueEntry, SentinelAllocator};
pub use reconcile::{reconcile, MismatchDiagnostic, ReconcileReport};
pub use save::{decode_state, encode_state, SaveStateError, SavedQueueState};
pub use schedule::{decayed_priority, reschedule, CostCache};
pub use scheduler::{
    DequeueRejected, EnqueuePlacement, EnqueueRejected, ProductionScheduler, TurnReport,
};
pub use shadow::ShadowQueue;
