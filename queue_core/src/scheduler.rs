use std::collections::BTreeMap;

use queue_api::{AuthoritativeQueue, BuildTarget, OwnershipSnapshot, PlanetId};
use thiserror::Error;

use crate::entry::{QueueEntry, SentinelAllocator};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::save::SavedQueueState;
use crate::schedule::{reschedule, CostCache};
use crate::shadow::ShadowQueue;

/// The engine refused to place an order. Expected flow when callers probe
/// candidate locations or designs; the shadow queue is untouched.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("authoritative queue rejected {target} at planet {location}")]
pub struct EnqueueRejected {
    pub target: BuildTarget,
    pub location: PlanetId,
}

/// The engine refused to remove the element at `index`; nothing changed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("authoritative queue refused to dequeue index {index}")]
pub struct DequeueRejected {
    pub index: usize,
}

/// Where a successful enqueue left the new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnqueuePlacement {
    /// Rank the order occupies after placement.
    pub rank: usize,
    /// The engine refused the tail-to-rank move; the order stays at the tail
    /// under a sentinel priority, still tracked.
    pub demoted: bool,
}

/// Everything one per-turn update did to the mirror.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    pub reconcile: ReconcileReport,
    /// Reorder commands issued by the priority pass.
    pub reorders: usize,
}

/// Per-empire scheduling context layered over the engine-owned production
/// queue.
///
/// Owns the shadow queue and all priority metadata; every creation, reorder
/// and removal against the authoritative queue must flow through this type so
/// the mirror stays consistent in content and order. Constructed once per AI
/// session and carried across turns (and, via [`SavedQueueState`], across
/// save/load).
#[derive(Debug, Clone, Default)]
pub struct ProductionScheduler {
    shadow: ShadowQueue,
    sentinels: SentinelAllocator,
    last_update: Option<u32>,
    costs: CostCache,
}

impl ProductionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shadow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shadow.is_empty()
    }

    /// Tracked entries, ascending by effective priority after a successful
    /// pass and positionally aligned with the authoritative queue.
    pub fn entries(&self) -> &[QueueEntry] {
        self.shadow.entries()
    }

    /// Reconcile the mirror against this turn's authoritative queue and
    /// re-impose the priority order.
    ///
    /// Must run once at the start of each turn before any enqueue or dequeue;
    /// repeated calls within the same turn are no-ops returning `None`.
    pub fn update_for_new_turn(
        &mut self,
        queue: &mut dyn AuthoritativeQueue,
        ownership: &OwnershipSnapshot,
        turn: u32,
    ) -> Option<TurnReport> {
        if self.last_update == Some(turn) {
            return None;
        }
        self.last_update = Some(turn);
        self.costs.clear();

        let snapshot = queue.snapshot();
        let previous = std::mem::take(&mut self.shadow);
        let (next, reconcile_report) =
            reconcile(previous, &snapshot, ownership, &mut self.sentinels);
        self.shadow = next;

        let reorders = reschedule(&mut self.shadow, queue, &mut self.costs, &mut self.sentinels);
        Some(TurnReport {
            reconcile: reconcile_report,
            reorders,
        })
    }

    /// Issue the type-appropriate creation command and track the new order.
    ///
    /// The engine appends at the tail; the order is then moved to the rank its
    /// priority demands (equal priorities keep arrival order). A refused move
    /// leaves it at the tail under a sentinel priority rather than losing
    /// track of it.
    pub fn enqueue_item(
        &mut self,
        queue: &mut dyn AuthoritativeQueue,
        target: BuildTarget,
        location: PlanetId,
        priority: f64,
    ) -> Result<EnqueuePlacement, EnqueueRejected> {
        let accepted = match &target {
            BuildTarget::Building(name) => queue.create_building_order(name, location),
            BuildTarget::Ship(design) => queue.create_ship_order(*design, location),
        };
        if !accepted {
            tracing::debug!(
                target: "empire_ai::queue",
                item = %target,
                %location,
                "enqueue.rejected"
            );
            return Err(EnqueueRejected { target, location });
        }

        let entry = QueueEntry::new(priority, target, location);
        let rank = self.shadow.upper_bound(&entry);
        self.shadow.insert_at(rank, entry);
        debug_assert_eq!(self.shadow.len(), queue.len(), "mirror out of step after enqueue");

        let tail = queue.len() - 1;
        if rank == tail {
            return Ok(EnqueuePlacement {
                rank,
                demoted: false,
            });
        }
        if queue.reorder(tail, rank) {
            return Ok(EnqueuePlacement {
                rank,
                demoted: false,
            });
        }

        let mut demoted = self.shadow.remove_at(rank);
        tracing::warn!(
            target: "empire_ai::queue",
            entry = %demoted,
            rank,
            "enqueue.reorder_refused"
        );
        demoted.demote_to_sentinel(self.sentinels.next());
        self.shadow.push_tail(demoted);
        Ok(EnqueuePlacement {
            rank: tail,
            demoted: true,
        })
    }

    /// Remove the order at `index` from the authoritative queue and the
    /// mirror. The mirror changes only on confirmed success.
    pub fn dequeue_item_by_index(
        &mut self,
        queue: &mut dyn AuthoritativeQueue,
        index: usize,
    ) -> Result<QueueEntry, DequeueRejected> {
        if index >= self.shadow.len() || !queue.remove(index) {
            tracing::debug!(target: "empire_ai::queue", index, "dequeue.refused");
            return Err(DequeueRejected { index });
        }
        Ok(self.shadow.remove_at(index))
    }

    /// Adjust the build quantity of the element at `index`. Quantities are
    /// not mirrored, but the command still flows through here so no caller
    /// touches the engine queue directly.
    pub fn change_quantity(
        &mut self,
        queue: &mut dyn AuthoritativeQueue,
        index: usize,
        quantity: i32,
    ) -> bool {
        queue.change_quantity(index, quantity)
    }

    /// Building orders currently tracked, grouped by building name.
    pub fn queued_buildings(&self) -> BTreeMap<String, Vec<PlanetId>> {
        let mut buildings: BTreeMap<String, Vec<PlanetId>> = BTreeMap::new();
        for entry in self.shadow.entries() {
            if let BuildTarget::Building(name) = &entry.target {
                buildings
                    .entry(name.clone())
                    .or_default()
                    .push(entry.location);
            }
        }
        buildings
    }

    /// Snapshot the mirror for the save file.
    pub fn save_state(&self) -> SavedQueueState {
        SavedQueueState {
            entries: self.shadow.entries().to_vec(),
            sentinel_issued: self.sentinels.issued(),
        }
    }

    /// Rebuild from a save. The turn marker is reset so the next
    /// [`update_for_new_turn`](Self::update_for_new_turn) runs a full
    /// reconciliation instead of trusting stale alignment.
    pub fn restore(state: SavedQueueState) -> Self {
        Self {
            shadow: ShadowQueue::from_entries(state.entries),
            sentinels: SentinelAllocator::resume(state.sentinel_issued),
            last_update: None,
            costs: CostCache::new(),
        }
    }
}
