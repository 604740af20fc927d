use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::TryRngCore;
use rand::rngs::OsRng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};

use crate::entities::personal_access_tokens;

const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest multiple of the charset length that fits in a byte. Bytes at or
/// above it are discarded so every symbol is equally likely.
const ACCEPT_BELOW: u8 = (256 / TOKEN_CHARSET.len() * TOKEN_CHARSET.len()) as u8;

/// Fields of a token row at insertion time.
pub struct NewToken {
    pub user_id: i32,
    pub name: String,
    pub token_hash: String,
    pub abilities: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, token: NewToken) -> Result<personal_access_tokens::Model> {
        let active = personal_access_tokens::ActiveModel {
            user_id: Set(token.user_id),
            name: Set(token.name),
            token_hash: Set(token.token_hash),
            abilities: Set(token.abilities),
            last_used_at: Set(Some(token.issued_at)),
            expires_at: Set(token.expires_at),
            created_at: Set(token.issued_at),
            updated_at: Set(token.issued_at),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert personal access token")
    }

    pub async fn get_by_hash(&self, token_hash: &str) -> Result<Option<personal_access_tokens::Model>> {
        personal_access_tokens::Entity::find()
            .filter(personal_access_tokens::Column::TokenHash.eq(token_hash))
            .one(&self.conn)
            .await
            .context("Failed to query token by hash")
    }

    /// Record a use of the token and return the stored `last_used_at`, which
    /// never moves backwards even if the clock does. `None` when the row is
    /// gone, e.g. revoked since it was read.
    pub async fn touch(
        &self,
        token: &personal_access_tokens::Model,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        let used_at = token.last_used_at.map_or(now, |prev| prev.max(now));

        let res = personal_access_tokens::Entity::update_many()
            .col_expr(
                personal_access_tokens::Column::LastUsedAt,
                Expr::value(used_at),
            )
            .col_expr(personal_access_tokens::Column::UpdatedAt, Expr::value(now))
            .filter(personal_access_tokens::Column::TokenHash.eq(token.token_hash.as_str()))
            .exec(&self.conn)
            .await
            .context("Failed to update token last_used_at")?;

        Ok((res.rows_affected > 0).then_some(used_at))
    }

    /// Hard delete by digest. Returns the number of rows removed.
    pub async fn delete_by_hash(&self, token_hash: &str) -> Result<u64> {
        let res = personal_access_tokens::Entity::delete_many()
            .filter(personal_access_tokens::Column::TokenHash.eq(token_hash))
            .exec(&self.conn)
            .await
            .context("Failed to delete token")?;

        Ok(res.rows_affected)
    }

    /// Delete every token that can no longer authenticate at `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let res = personal_access_tokens::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(personal_access_tokens::Column::ExpiresAt.is_null())
                    .add(personal_access_tokens::Column::ExpiresAt.lte(now)),
            )
            .exec(&self.conn)
            .await
            .context("Failed to delete expired tokens")?;

        Ok(res.rows_affected)
    }

    #[cfg(test)]
    pub async fn count_for_user(&self, user_id: i32) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        personal_access_tokens::Entity::find()
            .filter(personal_access_tokens::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count tokens for user")
    }
}

/// Generate a bearer secret of `len` alphanumeric characters from the OS RNG.
/// Fails rather than returning a short or empty secret.
pub fn generate_token_secret(len: usize) -> Result<String> {
    let mut rng = OsRng;
    let mut secret = String::with_capacity(len);
    let mut buf = [0u8; 64];

    while secret.len() < len {
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| anyhow::anyhow!("OS random source unavailable: {e}"))?;

        for &b in &buf {
            if secret.len() == len {
                break;
            }
            if b < ACCEPT_BELOW {
                secret.push(char::from(TOKEN_CHARSET[usize::from(b) % TOKEN_CHARSET.len()]));
            }
        }
    }

    Ok(secret)
}

/// SHA-256 of the raw secret as a 64 character lowercase hex string.
#[must_use]
pub fn hash_token(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());

    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_has_requested_length_and_charset() {
        for _ in 0..50 {
            let secret = generate_token_secret(40).unwrap();
            assert_eq!(secret.len(), 40);
            assert!(secret.bytes().all(|b| TOKEN_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn secret_longer_than_one_buffer_is_filled() {
        let secret = generate_token_secret(200).unwrap();
        assert_eq!(secret.len(), 200);
    }

    #[test]
    fn secrets_are_not_repeated() {
        let a = generate_token_secret(40).unwrap();
        let b = generate_token_secret(40).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn accept_bound_is_multiple_of_charset() {
        assert_eq!(ACCEPT_BELOW, 248);
    }

    #[test]
    fn hash_is_known_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_is_case_sensitive() {
        assert_ne!(hash_token("Token"), hash_token("token"));
    }
}
