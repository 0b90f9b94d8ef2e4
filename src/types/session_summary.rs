use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One entry in the session list: enough to render a sidebar row without
/// fetching the session's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    /// The session's opaque id.
    pub session_id: String,

    /// The first user message of the session, for preview display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,

    /// When the session was created. Display-only; unparseable values read
    /// as absent.
    #[serde(
        default,
        with = "crate::utils::time",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
}

impl SessionSummary {
    /// A preview of the session, truncated to at most `max_chars` characters
    /// with a trailing ellipsis, the way the sidebar renders it.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        let first = self.first_message.as_deref()?;
        if first.chars().count() > max_chars {
            let truncated: String = first.chars().take(max_chars).collect();
            Some(format!("{truncated}..."))
        } else {
            Some(first.to_string())
        }
    }
}
