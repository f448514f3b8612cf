//! IncidentReport entity
//!
//! Table: lex_incident_report

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Incident category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentCategory {
    Security,
    Harassment,
    Safety,
    It,
    Other,
}

impl IncidentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentCategory::Security => "security",
            IncidentCategory::Harassment => "harassment",
            IncidentCategory::Safety => "safety",
            IncidentCategory::It => "it",
            IncidentCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "security" => Some(IncidentCategory::Security),
            "harassment" => Some(IncidentCategory::Harassment),
            "safety" => Some(IncidentCategory::Safety),
            "it" => Some(IncidentCategory::It),
            "other" => Some(IncidentCategory::Other),
            _ => None,
        }
    }
}

/// Review state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    InReview,
    Closed,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::InReview => "in_review",
            IncidentStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(IncidentStatus::Open),
            "in_review" => Some(IncidentStatus::InReview),
            "closed" => Some(IncidentStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_incident_report")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Reporting user
    pub reporter_id: i64,

    /// Category: security, harassment, safety, it, other
    #[sea_orm(column_type = "String(Some(16))")]
    pub category: String,

    /// What happened
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Date the incident occurred (YYYY-MM-DD)
    #[sea_orm(column_type = "String(Some(10))")]
    pub occurred_on: String,

    /// Status: open, in_review, closed
    #[sea_orm(column_type = "String(Some(16))")]
    pub status: String,

    /// Reviewing user (admin/HR)
    #[sea_orm(nullable)]
    pub reviewed_by: Option<i64>,

    /// Resolution recorded when the report is closed
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution: Option<String>,

    /// Creation time (Unix timestamp)
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Option<IncidentStatus> {
        IncidentStatus::parse(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for c in [
            IncidentCategory::Security,
            IncidentCategory::Harassment,
            IncidentCategory::Safety,
            IncidentCategory::It,
            IncidentCategory::Other,
        ] {
            assert_eq!(IncidentCategory::parse(c.as_str()), Some(c));
        }
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            IncidentStatus::Open,
            IncidentStatus::InReview,
            IncidentStatus::Closed,
        ] {
            assert_eq!(IncidentStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(IncidentStatus::parse("resolved"), None);
    }
}
