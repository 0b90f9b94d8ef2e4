use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One stored exchange from a session's history.
///
/// `id` is the conversation id a rating refers to. Rating and feedback are
/// present when someone already rated the exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// Server-assigned id of the stored exchange.
    pub id: i64,

    /// The session the exchange belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// What the user said.
    pub user_message: String,

    /// What the assistant replied.
    pub bot_response: String,

    /// When the exchange was stored. Display-only; unparseable values read
    /// as absent.
    #[serde(
        default,
        with = "crate::utils::time",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,

    /// Star rating in 1.0..=5.0, when rated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    /// Free-text feedback attached to the rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}
