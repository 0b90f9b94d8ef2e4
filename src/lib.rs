// Public modules
pub mod auth;
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod store;
pub mod types;
pub mod utils;

// Re-exports
pub use auth::{AuthController, AuthState, RegisterForm};
pub use client::Chatbot;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use store::{Credentials, StateStore};
pub use types::*;
