use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::QueueEntry;

/// Mirror state that survives a save/load cycle: the ordered entry list plus
/// the running count of issued sentinel priorities. The last-processed-turn
/// marker is deliberately not part of it; a restored session must reconcile
/// from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQueueState {
    pub entries: Vec<QueueEntry>,
    pub sentinel_issued: u64,
}

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("save-state encode failed: {0}")]
    Encode(#[source] bincode::Error),
    #[error("save-state decode failed: {0}")]
    Decode(#[source] bincode::Error),
}

pub fn encode_state(state: &SavedQueueState) -> Result<Vec<u8>, SaveStateError> {
    bincode::serialize(state).map_err(SaveStateError::Encode)
}

pub fn decode_state(bytes: &[u8]) -> Result<SavedQueueState, SaveStateError> {
    bincode::deserialize(bytes).map_err(SaveStateError::Decode)
}
