use serde::{Deserialize, Serialize};

use crate::types::SessionSummary;

/// Response from `sessions`: every stored session, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionListResponse {
    /// The stored sessions.
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_list_deserialization() {
        let json = serde_json::json!({
            "sessions": [
                {"session_id": "sess-2", "first_message": "Câu hỏi thứ hai"},
                {"session_id": "sess-1", "first_message": "Câu hỏi đầu tiên"}
            ]
        });
        let resp: SessionListResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.sessions.len(), 2);
        assert_eq!(resp.sessions[0].session_id, "sess-2");
    }

    #[test]
    fn test_empty_session_list() {
        let resp: SessionListResponse =
            serde_json::from_value(serde_json::json!({"sessions": []})).unwrap();
        assert!(resp.sessions.is_empty());
    }
}
