use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Block shape discriminator, e.g. "hero" or "features"
    pub section_type: String,

    #[sea_orm(default_value = 0)]
    pub display_order: i32,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// JSON payload exactly as submitted
    #[sea_orm(column_type = "Text")]
    pub details: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
