use serde::{Deserialize, Serialize};

/// New-account payload submitted to `auth/register`.
///
/// `full_name` is the one optional field and is serialized as an explicit
/// `null` when absent, matching what the server expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterRequest {
    /// Desired account name.
    pub username: String,

    /// Contact email, required at registration.
    pub email: String,

    /// Account password.
    pub password: String,

    /// Optional human-readable name.
    pub full_name: Option<String>,
}

impl RegisterRequest {
    /// Creates a new RegisterRequest with the required fields.
    pub fn new<U, E, P>(username: U, email: E, password: P) -> Self
    where
        U: Into<String>,
        E: Into<String>,
        P: Into<String>,
    {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            full_name: None,
        }
    }

    /// Sets the full name.
    pub fn with_full_name<S: Into<String>>(mut self, full_name: S) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}
