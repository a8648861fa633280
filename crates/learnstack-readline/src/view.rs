//! Text rendering of the conversation state.

use chrono::Local;
use colored::Colorize;
use learnstack_core::chat::Chat;
use learnstack_core::conversation::{ConversationState, Message};

const PREVIEW_CHARS: usize = 48;

/// Resolves `/open` and `/delete` targets: a 1-based list position or a chat id.
pub fn resolve_chat<'a>(chats: &'a [Chat], target: &str) -> Option<&'a Chat> {
    if let Ok(position) = target.parse::<usize>() {
        if let Some(chat) = position.checked_sub(1).and_then(|index| chats.get(index)) {
            return Some(chat);
        }
    }
    chats.iter().find(|chat| chat.id == target)
}

/// Single-line preview of a chat's last message.
pub fn preview(text: &str) -> String {
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= PREVIEW_CHARS {
        return line;
    }
    let mut cut: String = line.chars().take(PREVIEW_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

pub fn timestamp(message: &Message) -> String {
    message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string()
}

pub fn print_chats(state: &ConversationState) {
    if state.chats.is_empty() {
        println!("{}", "No chats yet. Type a message to start one.".bright_black());
        return;
    }

    for (index, chat) in state.chats.iter().enumerate() {
        let marker = if state.current_chat_id.as_deref() == Some(chat.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {} {} {}",
            marker.bright_green(),
            format!("{:>2}.", index + 1).bright_black(),
            preview(&chat.last_message),
            format!("({})", chat.id).bright_black()
        );
    }
}

pub fn print_message(message: &Message) {
    let stamp = format!("[{}]", timestamp(message)).bright_black();
    if message.is_user {
        println!("{} {}", stamp, message.text.green());
    } else {
        println!("{} {}", stamp, message.text.bright_blue());
    }
}

pub fn print_messages(state: &ConversationState) {
    if state.messages.is_empty() {
        println!("{}", "(empty chat)".bright_black());
    }
    state.messages.iter().for_each(print_message);
}

/// Follows the assistant message of one turn as it grows.
///
/// Only messages appended after the printer was created are considered, so
/// earlier replies of the open chat are never echoed again.
#[derive(Debug)]
pub struct ReplyPrinter {
    first_new: usize,
    message_id: Option<String>,
    printed: String,
}

impl ReplyPrinter {
    /// Starts following replies appended to `state` from now on.
    pub fn after(state: &ConversationState) -> Self {
        Self {
            first_new: state.messages.len(),
            message_id: None,
            printed: String::new(),
        }
    }

    /// Returns the text to print for `state`, if the reply changed.
    ///
    /// Normally the unseen tail of the reply. If the shown text was replaced
    /// rather than extended (an unwrapped reply envelope), the whole text is
    /// returned on a fresh line.
    pub fn advance(&mut self, state: &ConversationState) -> Option<String> {
        let reply = state
            .messages
            .iter()
            .skip(self.first_new)
            .rfind(|message| !message.is_user)?;

        if self.message_id.as_deref() != Some(reply.id.as_str()) {
            self.message_id = Some(reply.id.clone());
            self.printed.clear();
        }
        if reply.text == self.printed {
            return None;
        }

        let fragment = match reply.text.strip_prefix(self.printed.as_str()) {
            Some(tail) => tail.to_string(),
            None => format!("\n{}", reply.text),
        };
        self.printed = reply.text.clone();
        Some(fragment)
    }

    /// Whether any reply text was printed.
    pub fn printed_anything(&self) -> bool {
        !self.printed.is_empty()
    }
}
