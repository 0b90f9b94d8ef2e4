use serde::{Deserialize, Serialize};

/// A star rating for one stored exchange, submitted to `rate`.
///
/// `feedback` is serialized as an explicit `null` when absent, matching the
/// web client's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingRequest {
    /// The exchange being rated, from
    /// [`ChatResponse::conversation_id`](crate::types::ChatResponse) or a
    /// history entry's `id`.
    pub conversation_id: i64,

    /// Stars, 1.0 through 5.0.
    pub rating: f32,

    /// Optional free-text feedback.
    pub feedback: Option<String>,
}

impl RatingRequest {
    /// Creates a new RatingRequest without feedback.
    pub fn new(conversation_id: i64, rating: f32) -> Self {
        Self {
            conversation_id,
            rating,
            feedback: None,
        }
    }

    /// Attaches feedback text.
    pub fn with_feedback<S: Into<String>>(mut self, feedback: S) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}
