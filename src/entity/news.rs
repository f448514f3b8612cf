//! News entity
//!
//! Table: lex_news

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_news")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Headline
    #[sea_orm(column_type = "String(Some(128))")]
    pub title: String,

    /// Article body
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Authoring user
    pub author_id: i64,

    /// Pinned items sort before everything else
    pub pinned: bool,

    /// Publication time (Unix timestamp)
    pub published_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
