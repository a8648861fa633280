//! REPL input parsing.

/// Slash commands offered for completion and hints.
pub const COMMANDS: &[&str] = &[
    "/chats", "/open", "/new", "/delete", "/clear", "/logout", "/help",
];

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Chats,
    Open(&'a str),
    New,
    Delete(&'a str),
    Clear,
    Logout,
    Help,
    Quit,
    /// Anything that is not a command is sent to the assistant.
    Send(&'a str),
    /// A known command used without its argument.
    MissingArgument(&'static str),
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parses a line. Returns `None` for blank input.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line == "quit" || line == "exit" {
            return Some(Command::Quit);
        }
        if !line.starts_with('/') {
            return Some(Command::Send(line));
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let command = match (name, arg.is_empty()) {
            ("/chats", _) => Command::Chats,
            ("/new", _) => Command::New,
            ("/clear", _) => Command::Clear,
            ("/logout", _) => Command::Logout,
            ("/help", _) => Command::Help,
            ("/open", true) => Command::MissingArgument("/open <n|id>"),
            ("/open", false) => Command::Open(arg),
            ("/delete", true) => Command::MissingArgument("/delete <n|id>"),
            ("/delete", false) => Command::Delete(arg),
            _ => Command::Unknown(name),
        };
        Some(command)
    }
}
