//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tokio::task;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::User;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::services::token_service::TokenService;

const MAX_FIELD_LEN: usize = 255;
const MAX_PASSWORD_BYTES: usize = 1024;

/// Stand-in hash verified when the email is unknown, so that both login
/// failures take the same time.
const DUMMY_PASSWORD: &str = "quire-dummy-password";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("email regex is valid")
    })
}

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<dyn TokenService>,
    security: SecurityConfig,
    dummy_hash: Arc<OnceLock<String>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, tokens: Arc<dyn TokenService>, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    fn validate_registration(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if name.chars().count() > MAX_FIELD_LEN {
            return Err(AuthError::Validation(format!(
                "Name must be {MAX_FIELD_LEN} characters or less"
            )));
        }

        if email.len() > MAX_FIELD_LEN || !email_regex().is_match(email) {
            return Err(AuthError::Validation("Email is not a valid address".to_string()));
        }

        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::Validation(format!(
                "Password must be {MAX_PASSWORD_BYTES} bytes or less"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let name = name.trim();
        let email = email.trim();
        self.validate_registration(name, email, password)?;

        let password = password.to_string();
        let config = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = self
            .store
            .create_user(name, email, &password_hash)
            .await?
            .ok_or(AuthError::DuplicateEmail)?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        token_name: Option<&str>,
    ) -> Result<LoginResult, AuthError> {
        let found = self
            .store
            .get_user_by_email_with_password(email.trim())
            .await?;

        let password = password.to_string();
        let config = self.security.clone();
        let dummy_hash = self.dummy_hash.clone();
        let stored_hash = found.as_ref().map(|(_, hash)| hash.clone());

        // Run CPU-intensive password verification in a blocking task
        let is_valid = task::spawn_blocking(move || match stored_hash {
            Some(hash) => verify_password(&password, &hash),
            None => {
                let dummy = match dummy_hash.get() {
                    Some(hash) => hash,
                    None => {
                        let hash = hash_password(DUMMY_PASSWORD, &config)?;
                        dummy_hash.get_or_init(|| hash)
                    }
                };
                verify_password(&password, dummy)?;
                Ok(false)
            }
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task panicked: {e}")))?
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        let Some((user, _)) = found.filter(|_| is_valid) else {
            warn!("Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let name = token_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.security.default_token_name);

        let token = self
            .tokens
            .issue(user.id, name, self.security.token_ttl())
            .await?;

        info!(user_id = user.id, token_id = token.id, "User logged in");
        Ok(LoginResult { user, token })
    }

    async fn logout(&self, token_hash: &str) -> Result<(), AuthError> {
        if self.tokens.revoke(token_hash).await? {
            info!("User logged out");
        }
        Ok(())
    }
}
