//! TrainingModuleContent entity
//!
//! Table: lex_training_content
//!
//! Ordered content sections within a training module.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_training_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning module
    pub module_id: i64,

    /// Position within the module (0-based, ascending display order)
    pub position: i32,

    /// Section heading
    #[sea_orm(column_type = "String(Some(128))")]
    pub heading: String,

    /// Section body (markdown)
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Optional embedded video URL
    #[sea_orm(column_type = "String(Some(256))", nullable)]
    pub video_url: Option<String>,

    /// Creation time (Unix timestamp)
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
