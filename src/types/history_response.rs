use serde::{Deserialize, Serialize};

use crate::types::HistoryEntry;

/// Response from `history/{session_id}`: the session's exchanges in
/// chronological order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryResponse {
    /// The stored exchanges, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}
