//! ActivityLog entity
//!
//! Table: lex_activity_log

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Event time (Unix timestamp)
    pub ts: i64,

    /// Acting user's email
    #[sea_orm(column_type = "String(Some(64))")]
    pub actor: String,

    /// Action name (e.g., "login", "create user")
    #[sea_orm(column_type = "String(Some(64))")]
    pub action: String,

    /// Human-readable detail
    #[sea_orm(column_type = "Text")]
    pub detail: String,

    /// Result: ok, failed
    #[sea_orm(column_type = "String(Some(16))")]
    pub result: String,

    /// Client IP, when known
    #[sea_orm(column_type = "String(Some(64))", nullable)]
    pub ip: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
