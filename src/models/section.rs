use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::entities::sections;

/// A page-building block. `details` is opaque JSON whose shape is implied by
/// `section_type`; it is kept as the exact text that was submitted.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: i32,
    pub name: String,
    pub section_type: String,
    pub display_order: i32,
    pub is_active: bool,
    pub details: Box<RawValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<sections::Model> for Section {
    type Error = serde_json::Error;

    fn try_from(model: sections::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            section_type: model.section_type,
            display_order: model.display_order,
            is_active: model.is_active,
            details: RawValue::from_string(model.details)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Every writable field of a section. Updates replace all of them.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionInput {
    pub name: String,
    pub section_type: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub details: Box<RawValue>,
}

const fn default_active() -> bool {
    true
}
