//! Backend client trait.
//!
//! Defines the interface for every remote capability of the LearnStack backend.

use super::model::{AuthResponse, Chat, ChatResponse};
use crate::error::Result;
use crate::user::BearerToken;
use async_trait::async_trait;

/// An abstract client for the LearnStack backend.
///
/// Each operation performs exactly one round trip; implementations must not
/// retry. Authenticated operations attach `token` as a bearer credential.
///
/// # Errors
///
/// - `authenticate` fails with `LearnstackError::Auth`
/// - chat list/get/delete operations fail with `LearnstackError::Fetch`
/// - both send operations fail with `LearnstackError::Send`
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Exchanges a username for an access token.
    async fn authenticate(&self, username: &str) -> Result<AuthResponse>;

    /// Lists every chat owned by the token's user.
    async fn list_chats(&self, token: &BearerToken) -> Result<Vec<Chat>>;

    /// Fetches a single chat. A missing chat is a `Fetch` error with status 404.
    async fn get_chat(&self, chat_id: &str, token: &BearerToken) -> Result<Chat>;

    /// Deletes a single chat.
    async fn delete_chat(&self, chat_id: &str, token: &BearerToken) -> Result<()>;

    /// Deletes every chat of the token's user.
    async fn delete_all_chats(&self, token: &BearerToken) -> Result<()>;

    /// Sends a message and waits for the complete reply.
    async fn send_message(
        &self,
        message: &str,
        history: &[String],
        token: &BearerToken,
    ) -> Result<ChatResponse>;

    /// Sends a message and streams the reply one character at a time.
    ///
    /// # Arguments
    ///
    /// * `message` - The user's new turn
    /// * `history` - Flattened texts of all earlier turns
    /// * `token` - Bearer credential
    /// * `on_chunk` - Called once per newly revealed reply character, in order
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The response body was fully consumed
    /// - `Err(LearnstackError::Send)`: Non-success status, missing body, or a
    ///   transport failure while reading the body
    async fn send_message_stream(
        &self,
        message: &str,
        history: &[String],
        token: &BearerToken,
        on_chunk: &mut (dyn FnMut(char) + Send),
    ) -> Result<()>;
}
