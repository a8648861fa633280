//! User domain model.

use std::fmt;

/// Opaque credential issued by the backend at authentication.
///
/// The value is never printed by `Debug`; use [`BearerToken::expose`] when the
/// raw token has to go on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub token: BearerToken,
}

impl User {
    pub fn new(username: impl Into<String>, token: BearerToken) -> Self {
        Self {
            username: username.into(),
            token,
        }
    }
}
