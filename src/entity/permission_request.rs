//! PermissionRequest entity
//!
//! Table: lex_permission_request
//!
//! HR workflow: an employee files a request, HR or an admin approves or
//! denies it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What is being requested
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Vacation,
    Remote,
    Leave,
    Equipment,
    Other,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Vacation => "vacation",
            RequestType::Remote => "remote",
            RequestType::Leave => "leave",
            RequestType::Equipment => "equipment",
            RequestType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vacation" => Some(RequestType::Vacation),
            "remote" => Some(RequestType::Remote),
            "leave" => Some(RequestType::Leave),
            "equipment" => Some(RequestType::Equipment),
            "other" => Some(RequestType::Other),
            _ => None,
        }
    }
}

/// Decision state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "denied" => Some(RequestStatus::Denied),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_permission_request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Requesting user
    pub requester_id: i64,

    /// Type: vacation, remote, leave, equipment, other
    #[sea_orm(column_type = "String(Some(16))")]
    pub request_type: String,

    /// First day the request applies to (YYYY-MM-DD)
    #[sea_orm(column_type = "String(Some(10))")]
    pub start_date: String,

    /// Last day, inclusive (YYYY-MM-DD; None for single-day/open requests)
    #[sea_orm(column_type = "String(Some(10))", nullable)]
    pub end_date: Option<String>,

    /// Reason given by the requester
    #[sea_orm(column_type = "Text")]
    pub reason: String,

    /// Status: pending, approved, denied
    #[sea_orm(column_type = "String(Some(16))")]
    pub status: String,

    /// Deciding user (admin/HR)
    #[sea_orm(nullable)]
    pub decided_by: Option<i64>,

    /// Decision time (Unix timestamp)
    #[sea_orm(nullable)]
    pub decided_at: Option<i64>,

    /// Optional note attached to the decision
    #[sea_orm(column_type = "Text", nullable)]
    pub decision_note: Option<String>,

    /// Creation time (Unix timestamp)
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Option<RequestStatus> {
        RequestStatus::parse(&self.status)
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip() {
        for t in [
            RequestType::Vacation,
            RequestType::Remote,
            RequestType::Leave,
            RequestType::Equipment,
            RequestType::Other,
        ] {
            assert_eq!(RequestType::parse(t.as_str()), Some(t));
        }
        assert_eq!(RequestType::parse("sabbatical"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Denied,
        ] {
            assert_eq!(RequestStatus::parse(s.as_str()), Some(s));
        }
    }
}
