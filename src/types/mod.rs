// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod health_response;
pub mod history_entry;
pub mod history_response;
pub mod login_request;
pub mod login_response;
pub mod message_response;
pub mod model_list_response;
pub mod new_session_response;
pub mod rating_request;
pub mod register_request;
pub mod session_list_response;
pub mod session_summary;
pub mod user_info;

// Re-exports
pub use chat_request::ChatRequest;
pub use chat_response::ChatResponse;
pub use health_response::HealthResponse;
pub use history_entry::HistoryEntry;
pub use history_response::HistoryResponse;
pub use login_request::LoginRequest;
pub use login_response::LoginResponse;
pub use message_response::MessageResponse;
pub use model_list_response::ModelListResponse;
pub use new_session_response::NewSessionResponse;
pub use rating_request::RatingRequest;
pub use register_request::RegisterRequest;
pub use session_list_response::SessionListResponse;
pub use session_summary::SessionSummary;
pub use user_info::UserInfo;
