//! Domain service for registration, login and logout.

use thiserror::Error;

use crate::db::User;
use crate::services::token_service::{IssuedToken, TokenError};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately identical for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub token: IssuedToken,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user after validating the input shape.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for malformed input and
    /// [`AuthError::DuplicateEmail`] if the email is taken.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError>;

    /// Verifies credentials and mints a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(
        &self,
        email: &str,
        password: &str,
        token_name: Option<&str>,
    ) -> Result<LoginResult, AuthError>;

    /// Revokes exactly the token with this digest.
    async fn logout(&self, token_hash: &str) -> Result<(), AuthError>;
}
