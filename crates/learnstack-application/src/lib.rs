//! Application layer for the LearnStack client.
//!
//! This crate provides the use cases that coordinate the backend client and
//! the conversation store: logging in and out, and driving the chat view.

pub mod auth_service;
pub mod conversation_controller;

pub use auth_service::AuthService;
pub use conversation_controller::ConversationController;
