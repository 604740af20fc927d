//! Domain service for bearer token issuance and validation.
//!
//! Raw secrets leave this service exactly once, from [`TokenService::issue`].
//! Everything persisted or passed around afterwards is the SHA-256 digest.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use thiserror::Error;

use crate::db::User;
use crate::models::Abilities;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    NotFound,

    #[error("Token expired")]
    Expired,

    #[error("Failed to generate token: {0}")]
    Entropy(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for TokenError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A freshly minted token. The only place the raw secret exists.
#[derive(Clone)]
pub struct IssuedToken {
    pub id: i32,
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Identity behind a presented secret.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub user: User,
    pub token_hash: String,
    pub abilities: Abilities,
    pub last_used_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Mints a token for `user_id` that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Entropy`] if no secure random secret could be produced.
    async fn issue(&self, user_id: i32, name: &str, ttl: Duration)
    -> Result<IssuedToken, TokenError>;

    /// Looks a raw secret up by digest and records the use.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::NotFound`] for unknown secrets and
    /// [`TokenError::Expired`] once `expires_at` has passed or was never set.
    async fn resolve(&self, raw_secret: &str) -> Result<ResolvedToken, TokenError>;

    /// Deletes the token with this digest and reports whether a row was
    /// removed. Absent tokens are not an error.
    async fn revoke(&self, token_hash: &str) -> Result<bool, TokenError>;

    /// Deletes tokens that can no longer authenticate. Returns how many were removed.
    async fn prune_expired(&self) -> Result<u64, TokenError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_become_database_errors() {
        let err = TokenError::from(anyhow::anyhow!("connection reset"));
        assert!(matches!(err, TokenError::Database(msg) if msg.contains("connection reset")));
    }
}
