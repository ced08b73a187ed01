use queue_api::ProductionElement;
use serde::{Deserialize, Serialize};

use crate::entry::QueueEntry;

/// The AI-side mirror of the authoritative production queue.
///
/// Entries are kept ascending by the [`QueueEntry`] ordering and, whenever the
/// last reconciliation pass succeeded, positionally aligned index-for-index
/// with the authoritative queue. Both properties are maintained by the
/// reconciler and scheduler; the container itself only offers the positional
/// and rank primitives they need.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowQueue {
    entries: Vec<QueueEntry>,
}

impl ShadowQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<QueueEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    pub fn into_entries(self) -> Vec<QueueEntry> {
        self.entries
    }

    /// First rank at which `entry` could be inserted while keeping the order
    /// (equal entries end up after the new one).
    pub fn lower_bound(&self, entry: &QueueEntry) -> usize {
        self.entries.partition_point(|existing| existing < entry)
    }

    /// Last rank at which `entry` could be inserted while keeping the order
    /// (equal entries stay ahead, so equal priorities keep arrival order).
    pub fn upper_bound(&self, entry: &QueueEntry) -> usize {
        self.entries.partition_point(|existing| existing <= entry)
    }

    pub fn insert_at(&mut self, index: usize, entry: QueueEntry) {
        self.entries.insert(index, entry);
    }

    pub fn push_tail(&mut self, entry: QueueEntry) {
        self.entries.push(entry);
    }

    pub fn remove_at(&mut self, index: usize) -> QueueEntry {
        self.entries.remove(index)
    }

    /// Index of the first entry equal to `entry` under the full ordering.
    ///
    /// When duplicate orders exist this is the duplicate-resolution policy:
    /// the first positional match wins.
    pub fn position_of_first(&self, entry: &QueueEntry) -> Option<usize> {
        self.entries.iter().position(|existing| existing == entry)
    }

    /// Whether every entry describes the same order as the element at the
    /// same position of `snapshot`.
    pub fn is_aligned_with(&self, snapshot: &[ProductionElement]) -> bool {
        self.entries.len() == snapshot.len()
            && self
                .entries
                .iter()
                .zip(snapshot)
                .all(|(entry, element)| entry.matches_element(element))
    }
}
