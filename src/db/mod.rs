use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{personal_access_tokens, sections};
use crate::models::SectionInput;

pub mod migrator;
pub mod repositories;

pub use repositories::token::{NewToken, generate_token_secret, hash_token};
pub use repositories::user::User;

/// Handle to the relational store. Cheap to clone; every clone shares the pool.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Each in-memory SQLite connection is a separate database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn section_repo(&self) -> repositories::section::SectionRepository {
        repositories::section::SectionRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        self.user_repo().create(name, email, password_hash).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    // Personal access tokens

    pub async fn create_token(&self, token: NewToken) -> Result<personal_access_tokens::Model> {
        self.token_repo().create(token).await
    }

    pub async fn get_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<personal_access_tokens::Model>> {
        self.token_repo().get_by_hash(token_hash).await
    }

    pub async fn touch_token(
        &self,
        token: &personal_access_tokens::Model,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        self.token_repo().touch(token, now).await
    }

    pub async fn delete_token_by_hash(&self, token_hash: &str) -> Result<u64> {
        self.token_repo().delete_by_hash(token_hash).await
    }

    pub async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        self.token_repo().delete_expired(now).await
    }

    #[cfg(test)]
    pub async fn count_tokens_for_user(&self, user_id: i32) -> Result<u64> {
        self.token_repo().count_for_user(user_id).await
    }

    // Sections

    pub async fn list_sections(&self) -> Result<Vec<sections::Model>> {
        self.section_repo().list().await
    }

    pub async fn get_section(&self, id: i32) -> Result<Option<sections::Model>> {
        self.section_repo().get(id).await
    }

    pub async fn create_section(&self, input: &SectionInput) -> Result<sections::Model> {
        self.section_repo().create(input).await
    }

    pub async fn update_section(
        &self,
        id: i32,
        input: &SectionInput,
    ) -> Result<Option<sections::Model>> {
        self.section_repo().update(id, input).await
    }

    pub async fn delete_section(&self, id: i32) -> Result<bool> {
        self.section_repo().delete(id).await
    }
}
