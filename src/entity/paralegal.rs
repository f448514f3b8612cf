//! Paralegal entity
//!
//! Table: lex_paralegal
//!
//! Pairs a paralegal account with its supervising attorney.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_paralegal")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// User account (unique, one profile per user)
    #[sea_orm(unique)]
    pub user_id: i64,

    /// Supervising attorney's user id
    pub supervising_attorney_id: i64,

    /// Practice area the paralegal supports
    #[sea_orm(column_type = "String(Some(64))")]
    pub practice_area: String,

    /// Whether the assignment is currently active
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
