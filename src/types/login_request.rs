use serde::{Deserialize, Serialize};

/// Credentials submitted to `auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    /// The account's username.
    pub username: String,

    /// The account's password, sent verbatim over the transport.
    pub password: String,
}

impl LoginRequest {
    /// Creates a new LoginRequest from the given username and password.
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
