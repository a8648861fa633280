//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single rendered turn.
///
/// Messages only exist on the client; the backend stores plain history
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A new user turn with a fresh unique id.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            text: text.into(),
            is_user: true,
            timestamp: Utc::now(),
        }
    }

    /// An empty assistant turn that streamed reply text is written into.
    pub fn assistant_placeholder() -> Self {
        Self {
            id: format!("bot-{}", Uuid::new_v4()),
            text: String::new(),
            is_user: false,
            timestamp: Utc::now(),
        }
    }

    fn from_history(chat_id: &str, index: usize, text: &str, is_user: bool) -> Self {
        Self {
            id: format!("{chat_id}-{index}"),
            text: text.to_string(),
            is_user,
            timestamp: Utc::now(),
        }
    }
}

/// Projects a chat's flat history into messages.
///
/// Entries are taken in (user, assistant) pairs. A trailing user entry without
/// an answer is still emitted; empty entries produce no message.
pub fn messages_from_history(chat_id: &str, history: &[String]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len());

    for (pair_index, pair) in history.chunks(2).enumerate() {
        let base = pair_index * 2;

        if let Some(user_text) = pair.first().filter(|text| !text.is_empty()) {
            messages.push(Message::from_history(chat_id, base, user_text, true));
        }
        if let Some(bot_text) = pair.get(1).filter(|text| !text.is_empty()) {
            messages.push(Message::from_history(chat_id, base + 1, bot_text, false));
        }
    }

    messages
}

/// The history sent alongside a new message: every prior turn's text, in order.
pub fn flatten_history(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|message| message.text.clone()).collect()
}
