//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which tracks the active
//! server-side conversation and mirrors its transcript locally, plus the
//! background task that periodically persists an unsent draft.

use std::sync::Arc;
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::client::Chatbot;
use crate::error::{Error, Result};
use crate::observability::{
    CHAT_DRAFT_SAVES, CHAT_MESSAGES, CHAT_RATINGS, CHAT_RESPONSE_LATENCY, CHAT_SEND_FAILURES,
    CHAT_SESSIONS_STARTED,
};
use crate::store::StateStore;
use crate::types::{ChatRequest, MessageResponse, RatingRequest, SessionSummary};

/// Greeting shown when a conversation begins.
pub const WELCOME_MESSAGE: &str =
    "Xin chào! Tôi là trợ lý AI của bạn. Hãy hỏi tôi bất cứ điều gì bằng tiếng Việt!";

/// How often the pending draft is written to the state store.
const DRAFT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(2);

/// One completed exchange in the local transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    /// What the user sent.
    pub user_message: String,

    /// The assistant's reply.
    pub bot_response: String,

    /// Server id of the stored exchange, used for rating. Absent when the
    /// server did not persist the exchange.
    pub conversation_id: Option<i64>,

    /// When the exchange was stored, for history display.
    pub timestamp: Option<OffsetDateTime>,
}

/// A chat session against the backend.
///
/// The session holds the server-issued session id and mirrors the
/// conversation locally so the most recent exchange can be rated without
/// another fetch. Messages themselves are stored server-side; `load`
/// rebuilds the local transcript from a session's history.
pub struct ChatSession {
    client: Chatbot,
    store: StateStore,
    session_id: Option<String>,
    transcript: Vec<ChatTurn>,
}

impl ChatSession {
    /// Creates a new chat session with no server-side conversation yet.
    pub fn new(client: Chatbot, store: StateStore) -> Self {
        Self {
            client,
            store,
            session_id: None,
            transcript: Vec::new(),
        }
    }

    /// Returns the active session id, if a conversation has been started.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the locally held transcript.
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Returns the number of completed exchanges.
    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    /// Starts a fresh conversation, discarding the local transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot issue a session id; the
    /// current session, if any, stays active.
    pub async fn start(&mut self) -> Result<String> {
        let resp = self.client.new_session().await?;
        self.session_id = Some(resp.session_id.clone());
        self.transcript.clear();
        CHAT_SESSIONS_STARTED.click();
        Ok(resp.session_id)
    }

    /// Sends a user message and records the completed exchange.
    ///
    /// On success the stored draft is cleared. On failure the transcript is
    /// left untouched, so the caller's echo of the user message stands on
    /// its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the
    /// message, including when no session id is held.
    pub async fn send(&mut self, text: &str) -> Result<ChatTurn> {
        let req = ChatRequest::new(text, self.session_id.clone());
        let start = Instant::now();
        let resp = match self.client.send_message(&req).await {
            Ok(resp) => resp,
            Err(err) => {
                CHAT_SEND_FAILURES.click();
                return Err(err);
            }
        };
        CHAT_MESSAGES.click();
        CHAT_RESPONSE_LATENCY.add(start.elapsed().as_secs_f64());

        let turn = ChatTurn {
            user_message: text.to_string(),
            bot_response: resp.response,
            conversation_id: resp.conversation_id,
            timestamp: None,
        };
        self.transcript.push(turn.clone());
        self.store.clear_draft().await?;
        Ok(turn)
    }

    /// Lists the saved conversations belonging to the logged-in user.
    pub async fn sessions(&self) -> Result<Vec<SessionSummary>> {
        Ok(self.client.sessions().await?.sessions)
    }

    /// Loads a saved conversation, replacing the active session id and the
    /// local transcript.
    ///
    /// Returns the number of exchanges loaded.
    pub async fn load(&mut self, session_id: &str) -> Result<usize> {
        let resp = self.client.history(session_id).await?;
        self.session_id = Some(session_id.to_string());
        self.transcript = resp
            .history
            .into_iter()
            .map(|entry| ChatTurn {
                user_message: entry.user_message,
                bot_response: entry.bot_response,
                conversation_id: Some(entry.id),
                timestamp: entry.timestamp,
            })
            .collect();
        Ok(self.transcript.len())
    }

    /// Rates the most recent exchange the server acknowledged.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the rating falls outside 1..=5 or
    /// when no exchange in the transcript carries a conversation id.
    pub async fn rate(&mut self, rating: f32, feedback: Option<String>) -> Result<MessageResponse> {
        if !(1.0..=5.0).contains(&rating) {
            return Err(Error::validation(
                "Vui lòng chọn số sao đánh giá",
                Some("rating".to_string()),
            ));
        }
        let Some(conversation_id) = self
            .transcript
            .iter()
            .rev()
            .find_map(|turn| turn.conversation_id)
        else {
            return Err(Error::validation(
                "Chưa có câu trả lời nào để đánh giá",
                None,
            ));
        };

        let mut req = RatingRequest::new(conversation_id, rating);
        if let Some(feedback) = feedback {
            req = req.with_feedback(feedback);
        }
        let resp = self.client.rate(&req).await?;
        CHAT_RATINGS.click();
        Ok(resp)
    }

    /// Deletes a saved conversation.
    ///
    /// Deleting the active conversation clears the local transcript and
    /// leaves the session unset; callers start a fresh one afterwards.
    pub async fn delete(&mut self, session_id: &str) -> Result<MessageResponse> {
        let resp = self.client.delete_session(session_id).await?;
        if self.session_id.as_deref() == Some(session_id) {
            self.session_id = None;
            self.transcript.clear();
        }
        Ok(resp)
    }
}

/// Spawns a background task that persists the pending draft every two
/// seconds.
///
/// The slot holds the most recently typed message the server has not yet
/// acknowledged. A non-empty slot is saved as the draft; an empty slot
/// clears any stored draft. Persistence failures are dropped and the next
/// tick retries.
pub fn spawn_draft_autosave(store: StateStore, pending: Arc<Mutex<String>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(DRAFT_AUTOSAVE_INTERVAL);
        loop {
            ticker.tick().await;
            save_pending_draft(&store, &pending).await;
        }
    })
}

async fn save_pending_draft(store: &StateStore, pending: &Mutex<String>) {
    let text = pending.lock().await.clone();
    if text.is_empty() {
        let _ = store.clear_draft().await;
    } else if store.set_draft(&text).await.is_ok() {
        CHAT_DRAFT_SAVES.click();
    }
}
