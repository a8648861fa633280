//! User domain module.
//!
//! This module contains the authenticated user and the session context that
//! owns it.
//!
//! # Module Structure
//!
//! - `model`: `User` and the opaque `BearerToken`
//! - `session`: `UserSession`, created on login and consumed on logout
//!
//! # Usage
//!
//! ```ignore
//! use learnstack_core::user::{BearerToken, User, UserSession};
//! ```

mod model;
mod session;

// Re-export public API
pub use model::{BearerToken, User};
pub use session::UserSession;
