//! HttpBackendClient - REST implementation of the LearnStack backend contract.
//!
//! Every call is a single request against the configured base URL; failures
//! are mapped onto the Auth / Fetch / Send error classes and never retried.

use crate::stream_decoder::stream_reply;
use async_trait::async_trait;
use learnstack_core::chat::{AuthResponse, BackendClient, Chat, ChatResponse, SendMessageRequest};
use learnstack_core::config::ClientConfig;
use learnstack_core::error::{LearnstackError, Result};
use learnstack_core::user::BearerToken;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

const JSON: &str = "application/json";

/// Backend client that talks to the LearnStack HTTP API.
#[derive(Clone)]
pub struct HttpBackendClient {
    client: Client,
    config: ClientConfig,
}

impl HttpBackendClient {
    /// Creates a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `LearnstackError::Config` if the underlying HTTP client cannot
    /// be built (e.g. no TLS backend available).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|err| LearnstackError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Pause between two streamed reply characters.
    pub fn typing_delay(&self) -> Duration {
        self.config.typing_delay()
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    fn authorized(&self, builder: RequestBuilder, token: &BearerToken) -> RequestBuilder {
        builder.header(ACCEPT, JSON).bearer_auth(token.expose())
    }

    async fn fetch(&self, builder: RequestBuilder, token: &BearerToken, what: &str) -> Result<Response> {
        let response = self
            .authorized(builder, token)
            .send()
            .await
            .map_err(|err| LearnstackError::fetch(None, format!("Failed to {what}: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(LearnstackError::fetch(
                Some(status.as_u16()),
                format!("Failed to {what}: HTTP {status}{body}"),
            ));
        }

        Ok(response)
    }

    async fn post_message(
        &self,
        message: &str,
        history: &[String],
        token: &BearerToken,
    ) -> Result<Response> {
        let request = SendMessageRequest {
            message: message.to_string(),
            history: history.to_vec(),
        };

        let response = self
            .authorized(self.client.post(self.url("/chat")), token)
            .json(&request)
            .send()
            .await
            .map_err(|err| LearnstackError::send(format!("Failed to send message: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(LearnstackError::send(format!(
                "Failed to send message: HTTP {status}{body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn authenticate(&self, username: &str) -> Result<AuthResponse> {
        let response = self
            .client
            .post(self.url("/auth/token"))
            .query(&[("username", username)])
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(|err| LearnstackError::auth(format!("Authentication request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(LearnstackError::auth(format!("HTTP {status}{body}")));
        }

        response
            .json()
            .await
            .map_err(|err| LearnstackError::auth(format!("Failed to parse token response: {err}")))
    }

    async fn list_chats(&self, token: &BearerToken) -> Result<Vec<Chat>> {
        let response = self
            .fetch(self.client.get(self.url("/chats")), token, "fetch chats")
            .await?;

        response
            .json()
            .await
            .map_err(|err| LearnstackError::fetch(None, format!("Failed to parse chats: {err}")))
    }

    async fn get_chat(&self, chat_id: &str, token: &BearerToken) -> Result<Chat> {
        let url = self.url(&format!("/chats/{chat_id}"));
        let response = self.fetch(self.client.get(url), token, "fetch chat").await?;

        response
            .json()
            .await
            .map_err(|err| LearnstackError::fetch(None, format!("Failed to parse chat: {err}")))
    }

    async fn delete_chat(&self, chat_id: &str, token: &BearerToken) -> Result<()> {
        let url = self.url(&format!("/chats/{chat_id}"));
        self.fetch(self.client.delete(url), token, "delete chat")
            .await?;
        Ok(())
    }

    async fn delete_all_chats(&self, token: &BearerToken) -> Result<()> {
        self.fetch(self.client.delete(self.url("/chats")), token, "delete all chats")
            .await?;
        Ok(())
    }

    async fn send_message(
        &self,
        message: &str,
        history: &[String],
        token: &BearerToken,
    ) -> Result<ChatResponse> {
        let response = self.post_message(message, history, token).await?;

        response
            .json()
            .await
            .map_err(|err| LearnstackError::send(format!("Failed to parse reply: {err}")))
    }

    async fn send_message_stream(
        &self,
        message: &str,
        history: &[String],
        token: &BearerToken,
        on_chunk: &mut (dyn FnMut(char) + Send),
    ) -> Result<()> {
        let response = self.post_message(message, history, token).await?;

        if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(LearnstackError::send(
                "Failed to send message: response carried no body",
            ));
        }

        let outcome = stream_reply(response.bytes_stream(), self.typing_delay(), on_chunk)
            .await
            .map_err(|err| LearnstackError::send(format!("Reply stream failed: {err}")))?;

        tracing::debug!(
            "[HttpBackendClient] Reply stream finished: {} chars, complete={}",
            outcome.emitted,
            outcome.completed
        );

        Ok(())
    }
}

/// Formats a non-empty error body as a suffix for error messages.
async fn error_body(response: Response) -> String {
    match response.text().await {
        Ok(text) if !text.trim().is_empty() => format!(" - {}", text.trim()),
        _ => String::new(),
    }
}
