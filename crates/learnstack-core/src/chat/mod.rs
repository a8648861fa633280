//! Chat domain module.
//!
//! This module contains the server-side chat records as the client sees them
//! and the `BackendClient` contract used to reach them.
//!
//! # Module Structure
//!
//! - `model`: wire-level records (`Chat`, `ChatResponse`, `AuthResponse`, `SendMessageRequest`)
//! - `client`: the `BackendClient` trait

mod client;
mod model;

// Re-export public API
pub use client::BackendClient;
pub use model::{AuthResponse, Chat, ChatResponse, SendMessageRequest};
