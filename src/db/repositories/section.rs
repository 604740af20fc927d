use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::sections;
use crate::models::SectionInput;

pub struct SectionRepository {
    conn: DatabaseConnection,
}

impl SectionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All sections, ascending by id.
    pub async fn list(&self) -> Result<Vec<sections::Model>> {
        sections::Entity::find()
            .order_by_asc(sections::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list sections")
    }

    pub async fn get(&self, id: i32) -> Result<Option<sections::Model>> {
        sections::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query section")
    }

    pub async fn create(&self, input: &SectionInput) -> Result<sections::Model> {
        let now = Utc::now();

        let active = sections::ActiveModel {
            name: Set(input.name.clone()),
            section_type: Set(input.section_type.clone()),
            display_order: Set(input.display_order),
            is_active: Set(input.is_active),
            details: Set(input.details.get().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert section")
    }

    /// Overwrite every writable field. Returns `None` if the section does not exist.
    pub async fn update(&self, id: i32, input: &SectionInput) -> Result<Option<sections::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: sections::ActiveModel = existing.into();
        active.name = Set(input.name.clone());
        active.section_type = Set(input.section_type.clone());
        active.display_order = Set(input.display_order);
        active.is_active = Set(input.is_active);
        active.details = Set(input.details.get().to_string());
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update section")?;

        Ok(Some(updated))
    }

    /// Returns `false` if nothing was deleted.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let res = sections::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete section")?;

        Ok(res.rows_affected > 0)
    }
}
