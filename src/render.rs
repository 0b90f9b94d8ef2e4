//! Terminal output for the chat binary.
//!
//! The web client renders message bubbles, red/green notification banners, a
//! status dot, and a session sidebar. This module carries those surfaces to
//! the terminal: a [`Renderer`] trait so output can be restyled or captured,
//! and a [`PlainTextRenderer`] that writes to stdout/stderr with optional
//! ANSI styling.

use std::io::{self, Stdout, Write};

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// ANSI escape code for dim text (timestamps, previews).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (the assistant's label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (the user's label).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (success banners, online status).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (error banners, offline status).
const ANSI_RED: &str = "\x1b[31m";

const CLOCK: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

///////////////////////////////////////////// Renderer /////////////////////////////////////////////

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - TUI rendering
pub trait Renderer: Send {
    /// Print one of the user's messages, as echoed live or replayed from
    /// history.
    fn print_user_message(&mut self, text: &str, timestamp: Option<OffsetDateTime>);

    /// Print one of the assistant's replies.
    fn print_bot_message(&mut self, text: &str, timestamp: Option<OffsetDateTime>);

    /// Print an error banner.
    fn print_error(&mut self, message: &str);

    /// Print a success banner.
    fn print_success(&mut self, message: &str);

    /// Print an informational line.
    fn print_info(&mut self, message: &str);

    /// Print the connection status line.
    fn print_status(&mut self, online: bool, status: &str);

    /// Print one row of the session list. `current` marks the session the
    /// chat is in right now.
    fn print_session_item(&mut self, session_id: &str, preview: Option<&str>, current: bool);
}

///////////////////////////////////////// PlainTextRenderer ////////////////////////////////////////

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout so a line lands before the next readline prompt.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn clock_suffix(&self, timestamp: Option<OffsetDateTime>) -> String {
        let Some(rendered) = timestamp.and_then(|ts| ts.format(CLOCK).ok()) else {
            return String::new();
        };
        if self.use_color {
            format!(" {ANSI_DIM}[{rendered}]{ANSI_RESET}")
        } else {
            format!(" [{rendered}]")
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_user_message(&mut self, text: &str, timestamp: Option<OffsetDateTime>) {
        let clock = self.clock_suffix(timestamp);
        if self.use_color {
            println!("{ANSI_YELLOW}bạn>{ANSI_RESET} {text}{clock}");
        } else {
            println!("bạn> {text}{clock}");
        }
        self.flush();
    }

    fn print_bot_message(&mut self, text: &str, timestamp: Option<OffsetDateTime>) {
        let clock = self.clock_suffix(timestamp);
        if self.use_color {
            println!("{ANSI_CYAN}bot>{ANSI_RESET} {text}{clock}");
        } else {
            println!("bot> {text}{clock}");
        }
        self.flush();
    }

    fn print_error(&mut self, message: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}{message}{ANSI_RESET}");
        } else {
            eprintln!("{message}");
        }
    }

    fn print_success(&mut self, message: &str) {
        if self.use_color {
            println!("{ANSI_GREEN}{message}{ANSI_RESET}");
        } else {
            println!("{message}");
        }
        self.flush();
    }

    fn print_info(&mut self, message: &str) {
        println!("{message}");
        self.flush();
    }

    fn print_status(&mut self, online: bool, status: &str) {
        if self.use_color {
            let dot_color = if online { ANSI_GREEN } else { ANSI_RED };
            println!("{dot_color}●{ANSI_RESET} {status}");
        } else {
            let dot = if online { "●" } else { "○" };
            println!("{dot} {status}");
        }
        self.flush();
    }

    fn print_session_item(&mut self, session_id: &str, preview: Option<&str>, current: bool) {
        let marker = if current { "*" } else { " " };
        match (self.use_color, preview) {
            (true, Some(preview)) => {
                println!("{marker} {session_id}  {ANSI_DIM}{preview}{ANSI_RESET}");
            }
            (false, Some(preview)) => println!("{marker} {session_id}  {preview}"),
            (_, None) => println!("{marker} {session_id}"),
        }
        self.flush();
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
