use serde::{Deserialize, Serialize};

/// Response from `new-session`: the freshly minted session id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSessionResponse {
    /// Opaque id for the new chat session.
    pub session_id: String,
}
