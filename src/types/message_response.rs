use serde::{Deserialize, Serialize};

/// A bare acknowledgement body, returned by `auth/register`, `rate`, and
/// session deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    /// The server's human-readable acknowledgement.
    pub message: String,
}
