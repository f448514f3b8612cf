//! User entity
//!
//! Table: lex_user

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    /// Created but never logged in
    Inactive = 0,
    /// Normal
    Active = 1,
    /// Locked out
    Disabled = 2,
}

impl From<i32> for UserStatus {
    fn from(value: i32) -> Self {
        match value {
            0 => UserStatus::Inactive,
            1 => UserStatus::Active,
            2 => UserStatus::Disabled,
            _ => UserStatus::Inactive,
        }
    }
}

impl From<UserStatus> for i32 {
    fn from(status: UserStatus) -> Self {
        status as i32
    }
}

/// Staff role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Attorney,
    Paralegal,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Attorney => "attorney",
            Role::Paralegal => "paralegal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "hr" => Some(Role::Hr),
            "attorney" => Some(Role::Attorney),
            "paralegal" => Some(Role::Paralegal),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Login email (unique)
    #[sea_orm(column_type = "String(Some(64))", unique)]
    pub email: String,

    /// Password (bcrypt hash)
    #[sea_orm(column_type = "String(Some(128))")]
    #[serde(skip_serializing)]
    pub password: String,

    /// Full name
    #[sea_orm(column_type = "String(Some(64))")]
    pub full_name: String,

    /// Phone
    #[sea_orm(column_type = "String(Some(20))", nullable)]
    pub phone: Option<String>,

    /// Role: admin, hr, attorney, paralegal
    #[sea_orm(column_type = "String(Some(16))")]
    pub role: String,

    /// Job title shown on the profile page
    #[sea_orm(column_type = "String(Some(64))", nullable)]
    pub title: Option<String>,

    /// Account status: 0=inactive, 1=active, 2=disabled
    pub status: i32,

    /// Last login time (Unix timestamp, 0 = never)
    pub last_login: i64,

    /// Creation time (Unix timestamp)
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// Cross-module relations are handled with explicit queries

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn status(&self) -> UserStatus {
        UserStatus::from(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Hr, Role::Attorney, Role::Paralegal] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("partner"), None);
    }

    #[test]
    fn test_status_from_i32() {
        assert_eq!(UserStatus::from(1), UserStatus::Active);
        assert_eq!(UserStatus::from(2), UserStatus::Disabled);
        assert_eq!(UserStatus::from(99), UserStatus::Inactive);
    }

    #[test]
    fn test_password_not_serialized() {
        let user = Model {
            id: 1,
            email: "jane@firm.example".to_string(),
            password: "$2b$12$secret".to_string(),
            full_name: "Jane Doe".to_string(),
            phone: None,
            role: "attorney".to_string(),
            title: None,
            status: 1,
            last_login: 0,
            created_at: 0,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("jane@firm.example"));
    }
}
