use queue_api::{OwnershipSnapshot, ProductionElement};
use serde::Serialize;
use thiserror::Error;

use crate::entry::{QueueEntry, SentinelAllocator};
use crate::shadow::ShadowQueue;

/// Classification of one cursor entry against the authoritative element it is
/// compared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepFate {
    /// Same order; the entry survives into the new shadow.
    Matched,
    /// Positionally absent and its planet is still owned: completed last turn.
    Finished,
    /// Positionally absent and its planet changed hands.
    Lost,
}

/// The authoritative queue diverged beyond what positional matching can
/// explain: some element has no shadow counterpart left. This means an
/// out-of-band mutation bypassed the scheduler.
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[error(
    "authoritative element at position {position} ({element:?}) has no shadow counterpart; \
     shadow and snapshot contents attached"
)]
pub struct MismatchDiagnostic {
    /// Snapshot position at which the cursor ran out.
    pub position: usize,
    /// The element that could not be matched.
    pub element: ProductionElement,
    /// Shadow queue as it stood before the pass.
    pub shadow: Vec<QueueEntry>,
    /// Authoritative snapshot driving the pass.
    pub snapshot: Vec<ProductionElement>,
}

/// Per-turn divergence classification produced by [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Entries whose orders completed last turn.
    pub finished: Vec<QueueEntry>,
    /// Entries whose build site was lost to another empire.
    pub lost: Vec<QueueEntry>,
    /// Orders discovered on newly captured planets, now tracked under a
    /// sentinel priority pending a keep-or-cancel decision downstream.
    pub conquered: Vec<QueueEntry>,
    /// Elements left over after an aborted pass, tracked under sentinel
    /// priorities rather than guessed at or dropped.
    pub unclassified: Vec<QueueEntry>,
    /// Present when the pass aborted; carries both queue contents.
    pub mismatch: Option<MismatchDiagnostic>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.mismatch.is_none()
    }
}

/// Align last turn's shadow queue against this turn's authoritative snapshot.
///
/// Single left-to-right pass over `snapshot`, consuming a cursor into the
/// previous shadow. The authoritative queue appends at the tail and only the
/// scheduler reorders it, so between turns the divergences are limited to
/// engine-side deletions (completed or invalidated rows) and insertions on
/// planets captured this turn; a greedy forward scan classifies every one of
/// them.
///
/// If the cursor runs out before an element finds its match, the pass aborts:
/// every remaining element is entered into the new shadow at its snapshot
/// position under a sentinel priority and reported as unclassified, and the
/// diagnostic carries both queue contents. No entry is ever guessed into a
/// match and no element is left untracked.
pub fn reconcile(
    previous: ShadowQueue,
    snapshot: &[ProductionElement],
    ownership: &OwnershipSnapshot,
    sentinels: &mut SentinelAllocator,
) -> (ShadowQueue, ReconcileReport) {
    let lost_planets = ownership.lost_planets();
    let gained_planets = ownership.gained_planets();

    let prior = previous.into_entries();
    let mut cursor = 0usize;
    let mut next = Vec::with_capacity(snapshot.len());
    let mut report = ReconcileReport::default();

    'snapshot: for (position, element) in snapshot.iter().enumerate() {
        // An element on a planet gained this turn was queued by the previous
        // owner; no shadow entry can exist for it. Track it at its snapshot
        // position under a sentinel priority and leave the cursor alone.
        if gained_planets.contains(&element.location) {
            let entry = QueueEntry::sentinel_from(element, sentinels.next());
            report.conquered.push(entry.clone());
            next.push(entry);
            continue;
        }

        loop {
            let Some(candidate) = prior.get(cursor) else {
                report.mismatch = Some(MismatchDiagnostic {
                    position,
                    element: element.clone(),
                    shadow: prior.clone(),
                    snapshot: snapshot.to_vec(),
                });
                for leftover in &snapshot[position..] {
                    let entry = QueueEntry::sentinel_from(leftover, sentinels.next());
                    report.unclassified.push(entry.clone());
                    next.push(entry);
                }
                break 'snapshot;
            };

            let fate = if candidate.matches_element(element) {
                StepFate::Matched
            } else if lost_planets.contains(&candidate.location) {
                StepFate::Lost
            } else {
                StepFate::Finished
            };

            match fate {
                StepFate::Matched => {
                    next.push(candidate.clone());
                    cursor += 1;
                    continue 'snapshot;
                }
                StepFate::Lost => {
                    report.lost.push(candidate.clone());
                    cursor += 1;
                }
                StepFate::Finished => {
                    report.finished.push(candidate.clone());
                    cursor += 1;
                }
            }
        }
    }

    // Entries beyond the snapshot's reach completed last turn unless their
    // planet changed hands. (After an aborted pass the cursor is already
    // exhausted and this classifies nothing.)
    for candidate in prior.iter().skip(cursor) {
        if lost_planets.contains(&candidate.location) {
            report.lost.push(candidate.clone());
        } else {
            report.finished.push(candidate.clone());
        }
    }

    if let Some(mismatch) = &report.mismatch {
        tracing::error!(
            target: "empire_ai::reconcile",
            position = mismatch.position,
            shadow = %render(&mismatch.shadow),
            snapshot = %render(&mismatch.snapshot),
            "reconcile.mismatch"
        );
    }
    tracing::info!(
        target: "empire_ai::reconcile",
        matched = next.len() - report.conquered.len() - report.unclassified.len(),
        finished = report.finished.len(),
        lost = report.lost.len(),
        conquered = report.conquered.len(),
        unclassified = report.unclassified.len(),
        "reconcile.pass"
    );

    (ShadowQueue::from_entries(next), report)
}

fn render<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<unserializable>".to_owned())
}
