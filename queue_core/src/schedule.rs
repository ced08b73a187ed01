use std::collections::HashMap;

use queue_api::{AuthoritativeQueue, BuildTarget, PlanetId, ProductionElement};

use crate::entry::SentinelAllocator;
use crate::shadow::ShadowQueue;

/// Turn-scoped cache of `cost_and_time` lookups, keyed by target and
/// location. Targets the engine declares location-invariant share one slot
/// under a canonical location key.
#[derive(Debug, Clone, Default)]
pub struct CostCache {
    entries: HashMap<(BuildTarget, PlanetId), (f64, i32)>,
}

impl CostCache {
    const CANONICAL_LOCATION: PlanetId = PlanetId(-1);

    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached lookups; called at the start of each turn's pass.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn cost_and_time(
        &mut self,
        queue: &dyn AuthoritativeQueue,
        element: &ProductionElement,
    ) -> (f64, i32) {
        let location = if queue.cost_invariant_to_location(&element.target) {
            Self::CANONICAL_LOCATION
        } else {
            element.location
        };
        let key = (element.target.clone(), location);
        if let Some(&cached) = self.entries.get(&key) {
            return cached;
        }
        let value = queue.cost_and_time(element);
        self.entries.insert(key, value);
        value
    }
}

/// Priority of a partially built order: scaled towards zero (maximal
/// precedence) as progress approaches the total cost, so nearly finished work
/// cannot be starved by newly queued high-base-priority orders.
pub fn decayed_priority(base_priority: f64, progress: f64, total_cost: f64) -> f64 {
    if total_cost <= 0.0 {
        return base_priority;
    }
    // base * (1 - progress/cost), arranged so whole-number inputs stay exact.
    base_priority * (total_cost - progress) / total_cost
}

/// Recompute every entry's effective priority from build progress and reorder
/// the authoritative queue to match, one command at a time.
///
/// Each entry is removed from its current rank and binary-search reinserted
/// under the composite ordering; when the rank changes a reorder command is
/// issued immediately, so later index computations see the live, already
/// shifted index space. Returns the number of reorder commands that
/// succeeded.
///
/// A refused reorder never drops the entry: it is returned to its physical
/// index and demoted to a sentinel priority, keeping the mirror positionally
/// faithful until a later pass succeeds.
pub fn reschedule(
    shadow: &mut ShadowQueue,
    queue: &mut dyn AuthoritativeQueue,
    costs: &mut CostCache,
    sentinels: &mut SentinelAllocator,
) -> usize {
    let pass_order = shadow.entries().to_vec();
    let mut moves = 0usize;

    for entry in pass_order {
        // The entry may have shifted while earlier entries moved; duplicates
        // resolve to the first positional match. A miss means this value was
        // already reprocessed via an identical duplicate.
        let Some(index) = shadow.position_of_first(&entry) else {
            continue;
        };
        let Some(element) = queue.element(index) else {
            tracing::warn!(
                target: "empire_ai::schedule",
                index,
                shadow_len = shadow.len(),
                authoritative_len = queue.len(),
                "reschedule.index_out_of_sync"
            );
            break;
        };

        let (total_cost, _turns) = costs.cost_and_time(queue, &element);
        let mut updated = shadow.remove_at(index);
        updated.current_priority =
            decayed_priority(updated.base_priority, element.progress, total_cost);
        let new_index = shadow.lower_bound(&updated);
        shadow.insert_at(new_index, updated);

        if new_index == index {
            continue;
        }
        if queue.reorder(index, new_index) {
            moves += 1;
        } else {
            let mut demoted = shadow.remove_at(new_index);
            tracing::warn!(
                target: "empire_ai::schedule",
                old_index = index,
                new_index,
                entry = %demoted,
                "reschedule.reorder_refused"
            );
            demoted.demote_to_sentinel(sentinels.next());
            shadow.insert_at(index, demoted);
        }
    }

    tracing::debug!(
        target: "empire_ai::schedule",
        entries = shadow.len(),
        moves,
        "reschedule.pass"
    );
    moves
}
