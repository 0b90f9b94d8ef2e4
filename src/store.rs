//! Durable client-side state.
//!
//! The store is a flat string-to-string map persisted as pretty JSON in a
//! single `state.json` under the state directory, written through on every
//! mutation. It plays the role a browser's site-local storage plays for the
//! web client: it remembers the bearer token, the account info shown in the
//! UI, and an unsent message draft between runs.
//!
//! The store is advisory. A missing or unreadable file starts empty, and
//! nothing in the chat lifecycle depends on a value being present.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::Result;
use crate::types::UserInfo;

/// Key holding the opaque bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the account info as JSON text.
pub const USER_INFO_KEY: &str = "user_info";
/// Key holding the unsent message draft.
pub const DRAFT_KEY: &str = "chatbot_draft";

const STATE_FILE: &str = "state.json";

//////////////////////////////////////////// Credentials ///////////////////////////////////////////

/// A stored token together with the account it belongs to.
///
/// The two are only ever read and written as a pair; the store never exposes
/// a token without its account or vice versa.
#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    /// The opaque bearer token.
    pub token: String,
    /// The account the token authenticates.
    pub user: UserInfo,
}

//////////////////////////////////////////// StateStore ////////////////////////////////////////////

/// Persistent string key-value store backing the session lifecycle.
///
/// Cheap to clone; clones share one in-memory map and one backing file.
#[derive(Clone, Debug)]
pub struct StateStore {
    path: PathBuf,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl StateStore {
    /// Opens the store under `state_dir`, creating the directory if needed.
    ///
    /// A missing state file starts the store empty. So does a file that does
    /// not parse as a JSON string map: stored state is advisory and stale or
    /// mangled state must never block startup.
    pub fn open<P: Into<PathBuf>>(state_dir: P) -> Result<Self> {
        let dir = state_dir.into();
        fs::create_dir_all(&dir)?;
        let path = dir.join(STATE_FILE);
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value stored under `key`.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries.get(key).cloned()
    }

    /// Stores `value` under `key` and persists.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    /// Removes `key` and persists. Removing an absent key is a no-op write.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        self.persist(&entries)
    }

    /// Returns the stored credentials.
    ///
    /// Yields `Some` only when the token and the account info are both
    /// present and the account info parses; anything partial reads as
    /// absent.
    pub async fn credentials(&self) -> Option<Credentials> {
        let entries = self.entries.lock().await;
        let token = entries.get(ACCESS_TOKEN_KEY)?.clone();
        let user = serde_json::from_str(entries.get(USER_INFO_KEY)?).ok()?;
        Some(Credentials { token, user })
    }

    /// Stores a token and its account info together, in one persist.
    pub async fn set_credentials(&self, token: &str, user: &UserInfo) -> Result<Credentials> {
        let user_json = serde_json::to_string(user)?;
        let mut entries = self.entries.lock().await;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        entries.insert(USER_INFO_KEY.to_string(), user_json);
        self.persist(&entries)?;
        Ok(Credentials {
            token: token.to_string(),
            user: user.clone(),
        })
    }

    /// Removes the token and its account info together, in one persist.
    pub async fn clear_credentials(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(USER_INFO_KEY);
        self.persist(&entries)
    }

    /// Returns the unsent draft, if one is stored and non-empty.
    pub async fn draft(&self) -> Option<String> {
        let draft = self.get(DRAFT_KEY).await?;
        if draft.is_empty() { None } else { Some(draft) }
    }

    /// Stores the unsent draft.
    pub async fn set_draft(&self, text: &str) -> Result<()> {
        self.set(DRAFT_KEY, text).await
    }

    /// Removes the unsent draft.
    pub async fn clear_draft(&self) -> Result<()> {
        self.remove(DRAFT_KEY).await
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
