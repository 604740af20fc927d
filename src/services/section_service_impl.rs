//! `SeaORM` implementation of the `SectionService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::models::{Section, SectionInput};
use crate::services::section_service::{SectionError, SectionService};

const MAX_NAME_LEN: usize = 255;
const MAX_TYPE_LEN: usize = 50;

pub struct SeaOrmSectionService {
    store: Store,
}

impl SeaOrmSectionService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn validate(input: &SectionInput) -> Result<(), SectionError> {
    if input.name.trim().is_empty() {
        return Err(SectionError::Validation("Section name is required".to_string()));
    }
    if input.name.chars().count() > MAX_NAME_LEN {
        return Err(SectionError::Validation(format!(
            "Section name must be {MAX_NAME_LEN} characters or less"
        )));
    }

    if input.section_type.trim().is_empty() {
        return Err(SectionError::Validation("Section type is required".to_string()));
    }
    if input.section_type.chars().count() > MAX_TYPE_LEN {
        return Err(SectionError::Validation(format!(
            "Section type must be {MAX_TYPE_LEN} characters or less"
        )));
    }

    Ok(())
}

#[async_trait]
impl SectionService for SeaOrmSectionService {
    async fn list(&self) -> Result<Vec<Section>, SectionError> {
        self.store
            .list_sections()
            .await?
            .into_iter()
            .map(|model| Section::try_from(model).map_err(SectionError::from))
            .collect()
    }

    async fn get(&self, id: i32) -> Result<Section, SectionError> {
        let model = self
            .store
            .get_section(id)
            .await?
            .ok_or(SectionError::NotFound(id))?;

        Ok(Section::try_from(model)?)
    }

    async fn create(&self, input: SectionInput) -> Result<Section, SectionError> {
        validate(&input)?;

        let model = self.store.create_section(&input).await?;
        info!(section_id = model.id, section_type = %model.section_type, "Section created");

        Ok(Section::try_from(model)?)
    }

    async fn update(&self, id: i32, input: SectionInput) -> Result<Section, SectionError> {
        validate(&input)?;

        let model = self
            .store
            .update_section(id, &input)
            .await?
            .ok_or(SectionError::NotFound(id))?;
        info!(section_id = id, "Section updated");

        Ok(Section::try_from(model)?)
    }

    async fn delete(&self, id: i32) -> Result<(), SectionError> {
        if !self.store.delete_section(id).await? {
            return Err(SectionError::NotFound(id));
        }
        info!(section_id = id, "Section deleted");
        Ok(())
    }
}
