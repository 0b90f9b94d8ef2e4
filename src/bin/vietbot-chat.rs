//! Interactive terminal client for the Vietnamese chatbot backend.
//!
//! This binary provides a line-based REPL that logs in against the backend,
//! keeps the login persisted across runs, and exchanges messages inside
//! server-side sessions.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! vietbot-chat
//!
//! # Point at another backend
//! vietbot-chat --api-url http://10.0.0.7:12000/api
//!
//! # Keep state somewhere else
//! vietbot-chat --state-dir /tmp/vietbot
//!
//! # Disable colors (useful for piping output)
//! vietbot-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/new` - Start a new conversation
//! - `/sessions` - List saved conversations
//! - `/load <id>` - Load a conversation
//! - `/rate <1-5>` - Rate the latest answer
//! - `/logout` - Log out
//! - `/quit` - Exit the application

use std::borrow::Cow;
use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::completion::Completer;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, Editor, Helper};
use tokio::sync::Mutex;

use vietbot::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, WELCOME_MESSAGE,
    help_text, parse_command, spawn_draft_autosave,
};
use vietbot::{AuthController, Chatbot, Credentials, Error, RegisterForm, StateStore};

/// Shown when a request cannot reach the backend at all.
const CONNECTION_ERROR: &str = "Không thể kết nối với server";

/// Shown when the bearer token is no longer accepted.
const SESSION_EXPIRED: &str = "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại.";

/// Characters of the first message shown per row in the session list.
const PREVIEW_CHARS: usize = 50;

/// How the chat loop ended.
enum ChatExit {
    /// Return to the login prompt.
    Logout,
    /// Leave the application.
    Quit,
}

/// Line editor helper that replaces typed characters with asterisks while a
/// password is being read.
struct InputMask {
    masked: bool,
}

impl Highlighter for InputMask {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masked {
            Cow::Owned("*".repeat(line.chars().count()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        self.masked
    }
}

impl Completer for InputMask {
    type Candidate = String;
}

impl Hinter for InputMask {
    type Hint = String;
}

impl Validator for InputMask {}

impl Helper for InputMask {}

type LineEditor = Editor<InputMask, DefaultHistory>;

/// Main entry point for the vietbot-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("vietbot-chat [OPTIONS]");
    let config = ChatConfig::resolve(args)?;

    let store = StateStore::open(&config.state_dir)?;
    let client = Chatbot::with_options(config.api_url.clone(), Some(config.timeout))?;
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let mut rl: LineEditor = Editor::new()?;
    rl.set_helper(Some(InputMask { masked: false }));
    // Masking only works while rustyline applies highlighting.
    rl.set_color_mode(ColorMode::Forced);

    println!("Vietbot Chat ({})", client.base_url());
    print_backend_status(&client, &mut renderer).await;

    let mut controller = AuthController::new(client.clone(), store.clone());

    loop {
        let Some(creds) = authenticate(&mut controller, &mut renderer, &mut rl).await? else {
            break;
        };

        println!();
        println!("Xin chào, {}!", creds.user.display_name());
        println!("Gõ /help để xem các lệnh, /quit để thoát.");
        println!();

        let mut session = ChatSession::new(client.clone(), store.clone());
        let exit = run_chat(
            &mut controller,
            &mut session,
            &client,
            &creds,
            &store,
            &mut renderer,
            &mut rl,
        )
        .await;
        match exit {
            ChatExit::Logout => continue,
            ChatExit::Quit => break,
        }
    }

    println!("Tạm biệt!");
    Ok(())
}

/// Prints one status line describing backend and Ollama connectivity.
async fn print_backend_status(client: &Chatbot, renderer: &mut PlainTextRenderer) {
    match client.health().await {
        Ok(health) if health.ollama_connected => renderer.print_status(true, "Đã kết nối"),
        Ok(_) => renderer.print_status(false, "Ollama không khả dụng"),
        Err(_) => renderer.print_status(false, "Mất kết nối"),
    }
}

/// Resolves a logged-in user, either from persisted credentials or by
/// prompting for a login.
///
/// Returns `None` when the user chooses to quit instead.
async fn authenticate(
    controller: &mut AuthController,
    renderer: &mut PlainTextRenderer,
    rl: &mut LineEditor,
) -> Result<Option<Credentials>, Box<dyn std::error::Error>> {
    if let Some(creds) = controller.resume().await? {
        return Ok(Some(creds));
    }

    println!("Đăng nhập để bắt đầu (gõ /register để tạo tài khoản, /quit để thoát).");
    let mut username_prefill = String::new();
    loop {
        let username = match rl.readline_with_initial("Tên đăng nhập: ", (&username_prefill, "")) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        username_prefill.clear();

        match username.trim() {
            "/quit" | "/exit" | "/q" => return Ok(None),
            "/register" => {
                if let Some(registered) = run_registration(controller, renderer, rl).await? {
                    username_prefill = registered;
                }
                continue;
            }
            _ => {}
        }

        let password = match read_masked(rl, "Mật khẩu: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match controller.login(&username, &password).await {
            Ok(creds) => return Ok(Some(creds)),
            Err(err) => renderer.print_error(
                &err.surface_message("Đăng nhập thất bại", "Lỗi kết nối. Vui lòng thử lại."),
            ),
        }
    }
}

/// Prompts for the registration form and submits it.
///
/// Returns the registered username on success so the login prompt can be
/// prefilled with it.
async fn run_registration(
    controller: &mut AuthController,
    renderer: &mut PlainTextRenderer,
    rl: &mut LineEditor,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    println!("Tạo tài khoản mới (Ctrl+C để quay lại).");

    let Some(username) = read_field(rl, "Tên đăng nhập: ", false)? else {
        return Ok(None);
    };
    let Some(email) = read_field(rl, "Email: ", false)? else {
        return Ok(None);
    };
    let Some(password) = read_field(rl, "Mật khẩu: ", true)? else {
        return Ok(None);
    };
    let Some(confirm_password) = read_field(rl, "Xác nhận mật khẩu: ", true)? else {
        return Ok(None);
    };
    let Some(full_name) = read_field(rl, "Họ và tên (tùy chọn): ", false)? else {
        return Ok(None);
    };

    let form = RegisterForm {
        username,
        email,
        password,
        confirm_password,
        full_name,
    };
    match controller.register(&form).await {
        Ok(_) => {
            renderer.print_success("Đăng ký thành công! Vui lòng đăng nhập.");
            Ok(Some(form.username))
        }
        Err(err) => {
            renderer.print_error(
                &err.surface_message("Đăng ký thất bại", "Lỗi kết nối. Vui lòng thử lại."),
            );
            Ok(None)
        }
    }
}

/// Reads one form field, masked or not.
///
/// Returns `None` when the user backs out with Ctrl+C or Ctrl+D.
fn read_field(
    rl: &mut LineEditor,
    prompt: &str,
    masked: bool,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let result = if masked {
        read_masked(rl, prompt)
    } else {
        rl.readline(prompt)
    };
    match result {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!();
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Reads a line with asterisk masking, restoring plain input afterwards.
fn read_masked(rl: &mut LineEditor, prompt: &str) -> rustyline::Result<String> {
    rl.set_helper(Some(InputMask { masked: true }));
    let line = rl.readline(prompt);
    rl.set_helper(Some(InputMask { masked: false }));
    line
}

/// Runs the chat REPL until the user quits or has to log in again.
async fn run_chat(
    controller: &mut AuthController,
    session: &mut ChatSession,
    client: &Chatbot,
    creds: &Credentials,
    store: &StateStore,
    renderer: &mut PlainTextRenderer,
    rl: &mut LineEditor,
) -> ChatExit {
    // Without a session id the server rejects sends, so a failure here
    // degrades the run until /new succeeds.
    match session.start().await {
        Ok(_) => renderer.print_bot_message(WELCOME_MESSAGE, None),
        Err(err) => {
            if expire_if_unauthorized(&err, controller, renderer).await {
                return ChatExit::Logout;
            }
            renderer.print_error(
                &err.surface_message("Không thể tạo phiên làm việc mới", CONNECTION_ERROR),
            );
        }
    }

    let pending = Arc::new(Mutex::new(String::new()));
    let mut prefill = store.draft().await.unwrap_or_default();
    if !prefill.is_empty() {
        *pending.lock().await = prefill.clone();
    }
    let autosave = spawn_draft_autosave(store.clone(), pending.clone());

    let exit = loop {
        let readline = if prefill.is_empty() {
            rl.readline("bạn> ")
        } else {
            let initial = std::mem::take(&mut prefill);
            rl.readline_with_initial("bạn> ", (initial.as_str(), ""))
        };

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => break ChatExit::Quit,
                        ChatCommand::Logout => {
                            if let Err(err) = controller.logout().await {
                                renderer.print_error(&err.to_string());
                            }
                            break ChatExit::Logout;
                        }
                        ChatCommand::Help => {
                            for help_line in help_text().lines() {
                                println!("    {}", help_line);
                            }
                        }
                        ChatCommand::New => match session.start().await {
                            Ok(_) => {
                                renderer.print_success("Đã tạo cuộc hội thoại mới");
                                renderer.print_bot_message(WELCOME_MESSAGE, None);
                            }
                            Err(err) => {
                                if expire_if_unauthorized(&err, controller, renderer).await {
                                    break ChatExit::Logout;
                                }
                                renderer.print_error(&err.surface_message(
                                    "Không thể tạo cuộc hội thoại mới",
                                    CONNECTION_ERROR,
                                ));
                            }
                        },
                        ChatCommand::Sessions => match session.sessions().await {
                            Ok(sessions) if sessions.is_empty() => {
                                renderer.print_info("Chưa có cuộc hội thoại nào");
                            }
                            Ok(sessions) => {
                                for summary in &sessions {
                                    let preview = summary.preview(PREVIEW_CHARS);
                                    let current =
                                        session.session_id() == Some(summary.session_id.as_str());
                                    renderer.print_session_item(
                                        &summary.session_id,
                                        preview.as_deref(),
                                        current,
                                    );
                                }
                            }
                            Err(err) => {
                                if expire_if_unauthorized(&err, controller, renderer).await {
                                    break ChatExit::Logout;
                                }
                                renderer.print_error(&err.surface_message(
                                    "Không thể tải lịch sử cuộc hội thoại",
                                    CONNECTION_ERROR,
                                ));
                            }
                        },
                        ChatCommand::Load(id) => match session.load(&id).await {
                            Ok(_) => {
                                for turn in session.transcript() {
                                    renderer.print_user_message(&turn.user_message, turn.timestamp);
                                    renderer.print_bot_message(&turn.bot_response, turn.timestamp);
                                }
                            }
                            Err(err) => {
                                if expire_if_unauthorized(&err, controller, renderer).await {
                                    break ChatExit::Logout;
                                }
                                renderer.print_error(&err.surface_message(
                                    "Không thể tải cuộc hội thoại",
                                    CONNECTION_ERROR,
                                ));
                            }
                        },
                        ChatCommand::Delete(id) => match session.delete(&id).await {
                            Ok(resp) => {
                                renderer.print_success(&resp.message);
                                if session.session_id().is_none() {
                                    match session.start().await {
                                        Ok(_) => {
                                            renderer.print_success("Đã tạo cuộc hội thoại mới");
                                            renderer.print_bot_message(WELCOME_MESSAGE, None);
                                        }
                                        Err(err) => {
                                            if expire_if_unauthorized(&err, controller, renderer)
                                                .await
                                            {
                                                break ChatExit::Logout;
                                            }
                                            renderer.print_error(&err.surface_message(
                                                "Không thể tạo cuộc hội thoại mới",
                                                CONNECTION_ERROR,
                                            ));
                                        }
                                    }
                                }
                            }
                            Err(err) => {
                                if expire_if_unauthorized(&err, controller, renderer).await {
                                    break ChatExit::Logout;
                                }
                                renderer.print_error(&err.surface_message(
                                    "Không thể xóa cuộc hội thoại",
                                    CONNECTION_ERROR,
                                ));
                            }
                        },
                        ChatCommand::Rate { rating, feedback } => {
                            match session.rate(f32::from(rating), feedback).await {
                                Ok(_) => renderer.print_success("Cảm ơn bạn đã đánh giá!"),
                                Err(err) => {
                                    if expire_if_unauthorized(&err, controller, renderer).await {
                                        break ChatExit::Logout;
                                    }
                                    renderer.print_error(&err.surface_message(
                                        "Không thể lưu đánh giá",
                                        "Có lỗi xảy ra khi gửi đánh giá",
                                    ));
                                }
                            }
                        }
                        ChatCommand::Models => match client.models().await {
                            Ok(resp) if resp.models.is_empty() => {
                                renderer.print_info("Không có mô hình nào");
                            }
                            Ok(resp) => {
                                for model in &resp.models {
                                    renderer.print_info(model);
                                }
                            }
                            Err(err) => {
                                if expire_if_unauthorized(&err, controller, renderer).await {
                                    break ChatExit::Logout;
                                }
                                renderer.print_error(&err.surface_message(
                                    "Không thể tải danh sách mô hình",
                                    CONNECTION_ERROR,
                                ));
                            }
                        },
                        ChatCommand::Health => print_backend_status(client, renderer).await,
                        ChatCommand::User => {
                            renderer.print_info(&format!(
                                "Đang đăng nhập: {}",
                                creds.user.display_name()
                            ));
                            if let Some(email) = &creds.user.email {
                                renderer.print_info(&format!("Email: {}", email));
                            }
                        }
                        ChatCommand::Invalid(message) => renderer.print_error(&message),
                    }
                    continue;
                }

                // Regular message - send inside the current session
                *pending.lock().await = line.to_string();
                match session.send(line).await {
                    Ok(turn) => {
                        pending.lock().await.clear();
                        renderer.print_bot_message(&turn.bot_response, None);
                    }
                    Err(err) => {
                        if expire_if_unauthorized(&err, controller, renderer).await {
                            break ChatExit::Logout;
                        }
                        renderer.print_error(&err.surface_message("Có lỗi xảy ra", CONNECTION_ERROR));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => break ChatExit::Quit,
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break ChatExit::Quit;
            }
        }
    };

    autosave.abort();
    exit
}

/// Handles a rejected bearer token: announces the expiry and clears the
/// stored login so the caller can return to the login prompt.
async fn expire_if_unauthorized(
    err: &Error,
    controller: &mut AuthController,
    renderer: &mut PlainTextRenderer,
) -> bool {
    if !err.is_authentication() {
        return false;
    }
    renderer.print_error(SESSION_EXPIRED);
    if let Err(err) = controller.logout().await {
        renderer.print_error(&err.to_string());
    }
    true
}
