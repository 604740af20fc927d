//! Domain service for polymorphic page sections.
//!
//! The `details` payload is opaque here: it must be well-formed JSON, nothing
//! more. Interpreting it per `section_type` is left to consumers.

use thiserror::Error;

use crate::models::{Section, SectionInput};

#[derive(Debug, Error)]
pub enum SectionError {
    #[error("Section {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SectionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SectionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Database(format!("stored section payload is not valid JSON: {err}"))
    }
}

#[async_trait::async_trait]
pub trait SectionService: Send + Sync {
    /// Every section, ascending by id.
    async fn list(&self) -> Result<Vec<Section>, SectionError>;

    async fn get(&self, id: i32) -> Result<Section, SectionError>;

    async fn create(&self, input: SectionInput) -> Result<Section, SectionError>;

    /// Replaces every field of an existing section.
    async fn update(&self, id: i32, input: SectionInput) -> Result<Section, SectionError>;

    async fn delete(&self, id: i32) -> Result<(), SectionError>;
}
