use serde::{Deserialize, Serialize};

/// Response from `models`: the model names the server can generate with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelListResponse {
    /// Available model names.
    #[serde(default)]
    pub models: Vec<String>,
}
