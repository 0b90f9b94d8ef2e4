use serde::{Deserialize, Serialize};

/// The model's reply to a [`ChatRequest`](crate::types::ChatRequest).
///
/// `conversation_id` identifies the stored exchange and is what a later
/// rating refers to. Servers running without persistence may omit it, so it
/// stays optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// The assistant's reply text.
    pub response: String,

    /// Server-assigned id of the stored exchange, used for rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,

    /// The session the exchange was recorded under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}
