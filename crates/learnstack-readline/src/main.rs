mod command;
mod view;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;

use learnstack_application::{AuthService, ConversationController};
use learnstack_core::chat::BackendClient;
use learnstack_core::user::UserSession;
use learnstack_infrastructure::{ConfigService, LearnstackPaths};
use learnstack_interaction::HttpBackendClient;

use command::{COMMANDS, Command};
use view::ReplyPrinter;

type LineEditor = Editor<CliHelper, DefaultHistory>;

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// How a chat session ended.
enum SessionEnd {
    Logout,
    Quit,
}

/// Logs go to stderr so they never interleave with a streamed reply.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ConfigService::new().get_config();
    tracing::info!("[learnstack] Using backend at {}", config.base_url);
    let client: Arc<dyn BackendClient> = Arc::new(HttpBackendClient::new(config)?);
    let auth = AuthService::new(Arc::clone(&client));

    let mut rl: LineEditor = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));
    let history_file = LearnstackPaths::history_file().ok();
    if let Some(path) = &history_file {
        if let Err(e) = rl.load_history(path) {
            tracing::debug!("[learnstack] No line history loaded: {}", e);
        }
    }

    println!("{}", "=== LearnStack AI ===".bright_magenta().bold());

    while let Some(session) = login(&mut rl, &auth).await? {
        let controller = ConversationController::new(Arc::clone(&client), session);
        let end = run_session(&mut rl, &controller).await?;
        auth.logout(controller.close());

        match end {
            SessionEnd::Logout => println!("{}", "Logged out.".bright_green()),
            SessionEnd::Quit => break,
        }
    }

    if let Some(path) = &history_file {
        save_history(&mut rl, path);
    }
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Prompts until a username is accepted. `None` means the user left.
async fn login(rl: &mut LineEditor, auth: &AuthService) -> Result<Option<UserSession>> {
    loop {
        let username = match rl.readline("username: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let username = username.trim();
        if username.is_empty() {
            continue;
        }
        if username == "quit" || username == "exit" {
            return Ok(None);
        }

        match auth.login(username).await {
            Ok(session) => {
                println!(
                    "{}",
                    format!("Welcome, {}!", session.username()).bright_green()
                );
                return Ok(Some(session));
            }
            Err(e) => eprintln!("{}", format!("Login failed: {}", e).red()),
        }
    }
}

async fn run_session(rl: &mut LineEditor, controller: &ConversationController) -> Result<SessionEnd> {
    if let Err(e) = controller.load_chats().await {
        eprintln!("{}", format!("Could not load chats: {}", e).red());
    } else {
        view::print_chats(&controller.snapshot());
    }
    println!(
        "{}",
        "Type a message to chat, '/help' for commands, or 'quit' to exit.".bright_black()
    );

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(SessionEnd::Quit),
            Err(err) => return Err(err.into()),
        };

        let Some(command) = Command::parse(&line) else {
            continue;
        };
        let _ = rl.add_history_entry(line.trim());

        match command {
            Command::Quit => return Ok(SessionEnd::Quit),
            Command::Logout => return Ok(SessionEnd::Logout),
            Command::Help => print_help(),
            Command::Chats => {
                if let Err(e) = controller.load_chats().await {
                    eprintln!("{}", format!("Could not refresh chats: {}", e).red());
                }
                view::print_chats(&controller.snapshot());
            }
            Command::New => {
                controller.new_chat();
                println!("{}", "Started a new chat.".bright_green());
            }
            Command::Open(target) => {
                let Some(chat_id) = chat_id_for(controller, target) else {
                    eprintln!("{}", format!("No chat '{}'", target).red());
                    continue;
                };
                match controller.select_chat(&chat_id).await {
                    Ok(()) => view::print_messages(&controller.snapshot()),
                    Err(e) => eprintln!("{}", format!("Could not open chat: {}", e).red()),
                }
            }
            Command::Delete(target) => {
                let Some(chat_id) = chat_id_for(controller, target) else {
                    eprintln!("{}", format!("No chat '{}'", target).red());
                    continue;
                };
                // Runs in the background; failures are logged.
                drop(controller.delete_chat(&chat_id));
                println!("{}", format!("Deleted chat {}.", chat_id).bright_green());
            }
            Command::Clear => {
                drop(controller.delete_all_chats());
                println!("{}", "Deleted all chats.".bright_green());
            }
            Command::Send(text) => send(controller, text).await,
            Command::MissingArgument(usage) => {
                eprintln!("{}", format!("Usage: {}", usage).yellow());
            }
            Command::Unknown(name) => {
                eprintln!("{}", format!("Unknown command {}. Try /help.", name).yellow());
            }
        }
    }
}

fn chat_id_for(controller: &ConversationController, target: &str) -> Option<String> {
    let state = controller.snapshot();
    view::resolve_chat(&state.chats, target).map(|chat| chat.id.clone())
}

/// Sends `text` and prints the reply as it streams in.
async fn send(controller: &ConversationController, text: &str) {
    let mut updates = controller.subscribe();
    let mut printer = ReplyPrinter::after(&updates.borrow_and_update());

    let sending = controller.send_message(text);
    tokio::pin!(sending);

    let result = loop {
        tokio::select! {
            result = &mut sending => break result,
            changed = updates.changed() => {
                if changed.is_err() {
                    break (&mut sending).await;
                }
                let fragment = printer.advance(&updates.borrow_and_update());
                if let Some(fragment) = fragment {
                    print_fragment(&fragment);
                }
            }
        }
    };

    // Transitions that landed after the last wake-up.
    if result.is_ok() {
        if let Some(fragment) = printer.advance(&controller.snapshot()) {
            print_fragment(&fragment);
        }
    }
    if printer.printed_anything() {
        println!();
    }

    if let Err(e) = result {
        if e.is_busy() {
            eprintln!("{}", "Still waiting for the previous reply.".yellow());
        } else {
            eprintln!("{}", format!("Message not sent: {}", e).red());
        }
    }
}

fn print_fragment(fragment: &str) {
    print!("{}", fragment.bright_blue());
    let _ = std::io::stdout().flush();
}

fn print_help() {
    let lines = [
        ("/chats", "list your chats"),
        ("/open <n|id>", "open a chat by list number or id"),
        ("/new", "start a new chat"),
        ("/delete <n|id>", "delete a chat"),
        ("/clear", "delete all chats"),
        ("/logout", "log out and switch user"),
        ("quit", "exit"),
    ];
    for (usage, what) in lines {
        println!("  {} {}", format!("{:<16}", usage).bright_cyan(), what.bright_black());
    }
}

fn save_history(rl: &mut LineEditor, path: &std::path::Path) {
    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!("[learnstack] Cannot create {:?}: {}", dir, e);
            return;
        }
    }
    if let Err(e) = rl.save_history(path) {
        tracing::warn!("[learnstack] Failed to save line history: {}", e);
    }
}
