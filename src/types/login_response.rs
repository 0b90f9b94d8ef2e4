use serde::{Deserialize, Serialize};

use crate::types::UserInfo;

/// Successful response from `auth/login`.
///
/// The token is an opaque bearer credential; the client attaches it to
/// protected requests without inspecting it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests.
    pub access_token: String,

    /// Token scheme as reported by the server, typically `"bearer"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// The account that was authenticated.
    pub user: UserInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_deserialization() {
        let json = serde_json::json!({
            "access_token": "tok-abc123",
            "token_type": "bearer",
            "user": {"username": "mai", "full_name": "Mai Trần"}
        });
        let resp: LoginResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.access_token, "tok-abc123");
        assert_eq!(resp.token_type.as_deref(), Some("bearer"));
        assert_eq!(resp.user.username, "mai");
    }

    #[test]
    fn test_login_response_without_token_type() {
        let json = serde_json::json!({
            "access_token": "tok-abc123",
            "user": {"username": "mai"}
        });
        let resp: LoginResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.token_type, None);
    }
}
