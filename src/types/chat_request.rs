use serde::{Deserialize, Serialize};

/// One user message submitted to the `chat` endpoint.
///
/// `session_id` is always present on the wire: a client that has no session
/// sends an explicit `null` and lets the server reject the request, rather
/// than inventing an id locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message text.
    pub message: String,

    /// The session this message belongs to, `null` when none is held.
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Creates a new ChatRequest for the given message and session.
    pub fn new<S: Into<String>>(message: S, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let req = ChatRequest::new("Xin chào", Some("sess-1".to_string()));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "Xin chào", "session_id": "sess-1"})
        );
    }

    #[test]
    fn test_chat_request_without_session_serializes_null() {
        let req = ChatRequest::new("Xin chào", None);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "Xin chào", "session_id": null})
        );
    }
}
