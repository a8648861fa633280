use chrono::{DateTime, Utc};

use super::model::{BearerToken, User};

/// The logged-in session context.
///
/// A `UserSession` exists only between a successful login and logout. It is
/// passed explicitly to whoever needs the credential; ending the session
/// consumes it so the token cannot be reused afterwards.
#[derive(Debug, Clone)]
pub struct UserSession {
    user: User,
    started_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user: User) -> Self {
        Self {
            user,
            started_at: Utc::now(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn token(&self) -> &BearerToken {
        &self.user.token
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Tears the session down and hands back the user it belonged to.
    pub fn end(self) -> User {
        self.user
    }
}
