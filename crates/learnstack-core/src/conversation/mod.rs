//! Conversation domain module.
//!
//! This module contains the client-side view of the active conversation and
//! the store that holds it.
//!
//! # Module Structure
//!
//! - `message`: `Message` and the history <-> message projections
//! - `state`: `ConversationState` and the `StateTransition`s that mutate it
//! - `store`: `ConversationStore`, the observable holder of the state
//! - `display`: extraction of the displayable reply from streamed text
//!
//! # Usage
//!
//! ```ignore
//! use learnstack_core::conversation::{ConversationStore, StateTransition};
//! ```

mod display;
mod message;
mod state;
mod store;

// Re-export public API
pub use display::display_text;
pub use message::{Message, flatten_history, messages_from_history};
pub use state::{ConversationPhase, ConversationState, StateTransition};
pub use store::ConversationStore;
