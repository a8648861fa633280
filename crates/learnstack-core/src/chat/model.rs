//! Chat records exchanged with the backend.

use serde::{Deserialize, Serialize};

/// Summary of one server-stored conversation.
///
/// `history` is the flat list of turn texts, alternating user and assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub reply: String,
}

/// Response body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default)]
    pub history: Vec<String>,
}

/// Response body of `POST /auth/token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
}

/// Request body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub history: Vec<String>,
}
