//! ClientCase entity
//!
//! Table: lex_client_case

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Case lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Open,
    Pending,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::Pending => "pending",
            CaseStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(CaseStatus::Open),
            "pending" => Some(CaseStatus::Pending),
            "closed" => Some(CaseStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_client_case")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Firm-wide case number (unique)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub case_number: String,

    /// Case title
    #[sea_orm(column_type = "String(Some(128))")]
    pub title: String,

    /// Client name
    #[sea_orm(column_type = "String(Some(128))")]
    pub client_name: String,

    /// Practice area
    #[sea_orm(column_type = "String(Some(64))")]
    pub practice_area: String,

    /// Status: open, pending, closed
    #[sea_orm(column_type = "String(Some(16))")]
    pub status: String,

    /// User who opened the case
    pub opened_by: i64,

    /// Attorney currently assigned (None = unassigned)
    #[sea_orm(nullable)]
    pub assigned_to: Option<i64>,

    /// Free-form description
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Opened time (Unix timestamp)
    pub opened_at: i64,

    /// Closed time (Unix timestamp, set when status becomes closed)
    #[sea_orm(nullable)]
    pub closed_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Option<CaseStatus> {
        CaseStatus::parse(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [CaseStatus::Open, CaseStatus::Pending, CaseStatus::Closed] {
            assert_eq!(CaseStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CaseStatus::parse("archived"), None);
    }
}
