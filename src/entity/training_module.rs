//! TrainingModule entity
//!
//! Table: lex_training_module

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_training_module")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Module title
    #[sea_orm(column_type = "String(Some(128))")]
    pub title: String,

    /// Short description shown in the module list
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Category (e.g., "compliance", "onboarding")
    #[sea_orm(column_type = "String(Some(64))")]
    pub category: String,

    /// Only published modules are visible to regular staff
    pub published: bool,

    /// Authoring user
    pub author_id: i64,

    /// Creation time (Unix timestamp)
    pub created_at: i64,

    /// Last update time (Unix timestamp)
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
