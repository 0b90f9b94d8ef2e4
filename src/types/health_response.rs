use serde::{Deserialize, Serialize};

/// Response from the `health` endpoint.
///
/// `ollama_connected` is what the status indicator keys off; `status` is the
/// server's own summary string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    /// `"healthy"` or `"unhealthy"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Whether the server can reach its model backend.
    #[serde(default)]
    pub ollama_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_deserialization() {
        let json = serde_json::json!({"status": "healthy", "ollama_connected": true});
        let resp: HealthResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.status.as_deref(), Some("healthy"));
        assert!(resp.ollama_connected);
    }

    #[test]
    fn test_health_response_defaults_disconnected() {
        let resp: HealthResponse =
            serde_json::from_value(serde_json::json!({"status": "healthy"})).unwrap();
        assert!(!resp.ollama_connected);
    }
}
