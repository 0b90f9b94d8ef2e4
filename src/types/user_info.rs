use serde::{Deserialize, Serialize};

/// The authenticated account as the server describes it.
///
/// Returned inside [`LoginResponse`](crate::types::LoginResponse) and persisted
/// verbatim in the state store under the `user_info` key. The client treats it
/// as display data only; authorization is carried by the token, never by these
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    /// Unique account name, the login identifier.
    pub username: String,

    /// Contact email, when the server shares it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Optional human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserInfo {
    /// Creates a new UserInfo carrying only a username.
    pub fn new<S: Into<String>>(username: S) -> Self {
        Self {
            username: username.into(),
            email: None,
            full_name: None,
        }
    }

    /// The name to greet the user with: the full name when present and
    /// non-empty, otherwise the username.
    pub fn display_name(&self) -> &str {
        match &self.full_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}
