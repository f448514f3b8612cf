//! CaseNote entity
//!
//! Table: lex_case_note

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_case_note")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Case the note belongs to
    pub case_id: i64,

    /// Author's user id
    pub author_id: i64,

    /// Note body
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Creation time (Unix timestamp)
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
