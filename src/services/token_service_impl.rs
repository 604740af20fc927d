//! `SeaORM` implementation of the `TokenService` trait.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::db::{NewToken, Store, generate_token_secret, hash_token};
use crate::models::Abilities;
use crate::services::token_service::{IssuedToken, ResolvedToken, TokenError, TokenService};

pub struct SeaOrmTokenService {
    store: Store,
    token_length: usize,
}

impl SeaOrmTokenService {
    #[must_use]
    pub const fn new(store: Store, token_length: usize) -> Self {
        Self {
            store,
            token_length,
        }
    }
}

#[async_trait]
impl TokenService for SeaOrmTokenService {
    async fn issue(
        &self,
        user_id: i32,
        name: &str,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let secret = generate_token_secret(self.token_length)
            .map_err(|e| TokenError::Entropy(e.to_string()))?;

        let now = Utc::now();
        let expires_at = now + ttl;

        let token = self
            .store
            .create_token(NewToken {
                user_id,
                name: name.to_string(),
                token_hash: hash_token(&secret),
                abilities: Abilities::all().to_string(),
                issued_at: now,
                expires_at: Some(expires_at),
            })
            .await?;

        debug!(user_id, token_id = token.id, "Issued personal access token");

        Ok(IssuedToken {
            id: token.id,
            secret,
            expires_at,
        })
    }

    async fn resolve(&self, raw_secret: &str) -> Result<ResolvedToken, TokenError> {
        let token_hash = hash_token(raw_secret);

        let token = self
            .store
            .get_token_by_hash(&token_hash)
            .await?
            .ok_or(TokenError::NotFound)?;

        let now = Utc::now();
        // A token without an expiry was never validly issued.
        match token.expires_at {
            Some(expires_at) if now < expires_at => {}
            _ => return Err(TokenError::Expired),
        }

        // Revoked between the lookup and the write.
        let last_used_at = self
            .store
            .touch_token(&token, now)
            .await?
            .ok_or(TokenError::NotFound)?;

        let user = self
            .store
            .get_user(token.user_id)
            .await?
            .ok_or(TokenError::NotFound)?;

        let Ok(abilities) = token.abilities.parse::<Abilities>();

        Ok(ResolvedToken {
            user,
            token_hash,
            abilities,
            last_used_at,
        })
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, TokenError> {
        let removed = self.store.delete_token_by_hash(token_hash).await?;
        debug!(removed, "Revoked personal access token");
        Ok(removed > 0)
    }

    async fn prune_expired(&self) -> Result<u64, TokenError> {
        Ok(self.store.delete_expired_tokens(Utc::now()).await?)
    }
}
