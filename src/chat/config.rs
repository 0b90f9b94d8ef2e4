//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg`, an optional YAML
//! configuration file, and the resolved configuration for a chat run.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// File looked up inside the state directory when `--config` is not given.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Command-line arguments for the vietbot-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the chatbot API.
    #[arrrg(optional, "API base URL (default: http://127.0.0.1:12000/api)", "URL")]
    pub api_url: Option<String>,

    /// Directory holding persisted login state and drafts.
    #[arrrg(optional, "State directory (default: ~/.vietbot)", "DIR")]
    pub state_dir: Option<String>,

    /// Explicit configuration file path.
    #[arrrg(optional, "Config file (default: <state-dir>/config.yaml)", "FILE")]
    pub config: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// On-disk configuration, stored as YAML.
///
/// Every field is optional; anything absent falls back to command-line
/// arguments, environment variables, or built-in defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ConfigFile {
    /// Base URL of the chatbot API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Directory holding persisted login state and drafts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<String>,

    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_color: Option<bool>,
}

impl ConfigFile {
    /// Loads a configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Loads a configuration file if it exists, or returns defaults.
    pub fn from_file_if_exists<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Resolved configuration for a chat run.
///
/// Values are resolved with the precedence: command-line arguments, then
/// environment variables, then the config file, then built-in defaults.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Base URL of the chatbot API. `None` lets the client pick its default.
    pub api_url: Option<String>,

    /// Directory holding persisted login state and drafts.
    pub state_dir: PathBuf,

    /// Request timeout for API calls.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - API URL: left to the client (`http://127.0.0.1:12000/api`)
    /// - State directory: `~/.vietbot`
    /// - Timeout: 60 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            api_url: None,
            state_dir: default_state_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            use_color: true,
        }
    }

    /// Resolves the effective configuration from command-line arguments.
    ///
    /// An explicit `--config` file must exist and parse; the implicit
    /// `<state-dir>/config.yaml` is loaded only when present.
    pub fn resolve(args: ChatArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => ConfigFile::from_file(path)?,
            None => {
                // The implicit config lives in the state directory known
                // before reading any file.
                let state_dir = state_dir_before_file(&args);
                ConfigFile::from_file_if_exists(state_dir.join(CONFIG_FILE_NAME))?
            }
        };

        let api_url = args
            .api_url
            .or_else(|| env::var("VIETBOT_API_URL").ok())
            .or(file.api_url);
        let state_dir = args
            .state_dir
            .as_deref()
            .or(file.state_dir.as_deref())
            .map(PathBuf::from)
            .unwrap_or_else(default_state_dir);
        let timeout_secs = args
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let use_color = !(args.no_color || file.no_color.unwrap_or(false));

        Ok(ChatConfig {
            api_url,
            state_dir,
            timeout: Duration::from_secs(timeout_secs),
            use_color,
        })
    }

    /// Sets the API base URL.
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = Some(api_url);
        self
    }

    /// Sets the state directory.
    pub fn with_state_dir(mut self, state_dir: PathBuf) -> Self {
        self.state_dir = state_dir;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn state_dir_before_file(args: &ChatArgs) -> PathBuf {
    args.state_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_state_dir)
}

/// Returns `~/.vietbot`, or a relative `.vietbot` when the home directory
/// cannot be determined.
fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".vietbot"))
        .unwrap_or_else(|| PathBuf::from(".vietbot"))
}
