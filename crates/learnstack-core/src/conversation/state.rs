//! Conversation state and its transitions.

use super::message::Message;
use crate::chat::Chat;

/// Whether a message send is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    Idle,
    Sending,
}

/// Single source of truth for the chat view.
///
/// `messages` is either empty with no `current_chat_id` (a new chat) or the
/// projected history of `current_chat_id`, plus any turns sent since.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub chats: Vec<Chat>,
    pub current_chat_id: Option<String>,
    pub messages: Vec<Message>,
    pub is_loading: bool,
}

/// Every way the conversation state can change.
///
/// Optimistic operations come in pairs with their outcome:
/// `TurnStarted` is settled by `TurnCompleted` or undone by `TurnRolledBack`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateTransition {
    /// Replaces the chat list with a fresh copy from the backend.
    ChatsLoaded(Vec<Chat>),
    /// Leaves the current chat for an empty one.
    NewChat,
    /// Shows a chat fetched from the backend.
    ChatOpened {
        chat_id: String,
        messages: Vec<Message>,
    },
    /// Drops a chat from the list; leaves it if it was open.
    ChatRemoved { chat_id: String },
    /// Drops every chat and leaves the current one.
    AllChatsRemoved,
    /// Appends the user's turn and the empty assistant placeholder.
    TurnStarted { user: Message, placeholder: Message },
    /// Rewrites the text of a streaming message.
    ReplyUpdated { message_id: String, text: String },
    /// The send finished successfully.
    TurnCompleted,
    /// The send failed; both messages of the turn are removed.
    TurnRolledBack {
        user_id: String,
        placeholder_id: String,
    },
    /// Returns to the initial, empty state.
    Reset,
}

impl ConversationState {
    pub fn phase(&self) -> ConversationPhase {
        if self.is_loading {
            ConversationPhase::Sending
        } else {
            ConversationPhase::Idle
        }
    }

    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    pub fn current_chat(&self) -> Option<&Chat> {
        let current = self.current_chat_id.as_deref()?;
        self.chats.iter().find(|chat| chat.id == current)
    }

    pub fn apply(&mut self, transition: StateTransition) {
        match transition {
            StateTransition::ChatsLoaded(chats) => {
                self.chats = chats;
            }
            StateTransition::NewChat => self.leave_chat(),
            StateTransition::ChatOpened { chat_id, messages } => {
                self.current_chat_id = Some(chat_id);
                self.messages = messages;
            }
            StateTransition::ChatRemoved { chat_id } => {
                self.chats.retain(|chat| chat.id != chat_id);
                if self.current_chat_id.as_deref() == Some(chat_id.as_str()) {
                    self.leave_chat();
                }
            }
            StateTransition::AllChatsRemoved => {
                self.chats.clear();
                self.leave_chat();
            }
            StateTransition::TurnStarted { user, placeholder } => {
                self.messages.push(user);
                self.messages.push(placeholder);
                self.is_loading = true;
            }
            StateTransition::ReplyUpdated { message_id, text } => {
                if let Some(message) = self
                    .messages
                    .iter_mut()
                    .find(|message| message.id == message_id)
                {
                    message.text = text;
                }
            }
            StateTransition::TurnCompleted => {
                self.is_loading = false;
            }
            StateTransition::TurnRolledBack {
                user_id,
                placeholder_id,
            } => {
                self.messages
                    .retain(|message| message.id != user_id && message.id != placeholder_id);
                self.is_loading = false;
            }
            StateTransition::Reset => *self = Self::default(),
        }
    }

    fn leave_chat(&mut self) {
        self.current_chat_id = None;
        self.messages.clear();
    }
}
