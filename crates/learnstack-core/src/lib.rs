//! Domain layer of the LearnStack chat client.
//!
//! Holds the records exchanged with the backend, the `BackendClient`
//! contract, the client-side conversation state and the shared error type.

pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod user;

// Re-export common types
pub use chat::BackendClient;
pub use config::ClientConfig;
pub use error::{LearnstackError, Result};
