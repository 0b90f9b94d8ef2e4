//! Chat application module for interactive Vietnamese conversations.
//!
//! This module provides a line-based REPL chat interface built on top of
//! the vietbot client library. It supports:
//!
//! - Server-side conversations addressed by session id
//! - Slash commands for session control, history, and ratings
//! - A periodically persisted draft of unsent input
//! - Configuration from arguments, environment, and a YAML file
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and API interaction
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, ConfigFile};
pub use session::{ChatSession, ChatTurn, WELCOME_MESSAGE, spawn_draft_autosave};
