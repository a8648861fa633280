//! Login and logout.

use learnstack_core::chat::BackendClient;
use learnstack_core::error::{LearnstackError, Result};
use learnstack_core::user::{BearerToken, User, UserSession};
use std::sync::Arc;

/// Creates and tears down [`UserSession`]s.
pub struct AuthService {
    client: Arc<dyn BackendClient>,
}

impl AuthService {
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self { client }
    }

    /// Authenticates `username` and opens a session for it.
    ///
    /// # Errors
    ///
    /// Returns `LearnstackError::Auth` for an empty username or when the
    /// backend refuses to issue a token.
    pub async fn login(&self, username: &str) -> Result<UserSession> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LearnstackError::auth("Username must not be empty"));
        }

        let auth = self.client.authenticate(username).await.map_err(|e| {
            tracing::warn!("[AuthService] Login failed for {}: {}", username, e);
            e
        })?;

        tracing::info!("[AuthService] Logged in as {}", username);
        Ok(UserSession::new(User::new(
            username,
            BearerToken::new(auth.access_token),
        )))
    }

    /// Ends `session`; its token is dropped with it.
    pub fn logout(&self, session: UserSession) {
        let user = session.end();
        tracing::info!("[AuthService] Logged out {}", user.username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnstack_core::chat::{AuthResponse, Chat, ChatResponse};

    struct TokenOnlyBackend;

    #[async_trait]
    impl BackendClient for TokenOnlyBackend {
        async fn authenticate(&self, username: &str) -> Result<AuthResponse> {
            if username == "ada" {
                Ok(AuthResponse {
                    access_token: "tok-ada".to_string(),
                })
            } else {
                Err(LearnstackError::auth("HTTP 401 Unauthorized"))
            }
        }

        async fn list_chats(&self, _token: &BearerToken) -> Result<Vec<Chat>> {
            unreachable!()
        }

        async fn get_chat(&self, _chat_id: &str, _token: &BearerToken) -> Result<Chat> {
            unreachable!()
        }

        async fn delete_chat(&self, _chat_id: &str, _token: &BearerToken) -> Result<()> {
            unreachable!()
        }

        async fn delete_all_chats(&self, _token: &BearerToken) -> Result<()> {
            unreachable!()
        }

        async fn send_message(
            &self,
            _message: &str,
            _history: &[String],
            _token: &BearerToken,
        ) -> Result<ChatResponse> {
            unreachable!()
        }

        async fn send_message_stream(
            &self,
            _message: &str,
            _history: &[String],
            _token: &BearerToken,
            _on_chunk: &mut (dyn FnMut(char) + Send),
        ) -> Result<()> {
            unreachable!()
        }
    }

    fn service() -> AuthService {
        AuthService::new(Arc::new(TokenOnlyBackend))
    }

    #[tokio::test]
    async fn test_login_creates_session() {
        let session = service().login("  ada ").await.unwrap();

        assert_eq!(session.username(), "ada");
        assert_eq!(session.token().expose(), "tok-ada");
    }

    #[tokio::test]
    async fn test_login_rejections_are_auth_errors() {
        assert!(service().login("mallory").await.unwrap_err().is_auth());
        assert!(service().login("   ").await.unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn test_logout_consumes_session() {
        let auth = service();
        let session = auth.login("ada").await.unwrap();
        auth.logout(session);
    }
}
