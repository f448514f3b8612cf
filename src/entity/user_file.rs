//! UserFile entity
//!
//! Table: lex_user_file
//!
//! File contents are stored base64-encoded in the `data` column and decoded
//! by the serving handler. `size` is the decoded byte count.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the file is used for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Document,
    Avatar,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Document => "document",
            FileKind::Avatar => "avatar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "document" => Some(FileKind::Document),
            "avatar" => Some(FileKind::Avatar),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lex_user_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning user
    pub owner_id: i64,

    /// Original file name
    #[sea_orm(column_type = "String(Some(256))")]
    pub name: String,

    /// MIME type supplied at upload
    #[sea_orm(column_type = "String(Some(128))")]
    pub content_type: String,

    /// Decoded size in bytes
    pub size: i64,

    /// Base64-encoded content
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub data: String,

    /// Kind: document, avatar
    #[sea_orm(column_type = "String(Some(16))")]
    pub kind: String,

    /// Upload time (Unix timestamp)
    pub uploaded_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(FileKind::parse("document"), Some(FileKind::Document));
        assert_eq!(FileKind::parse("avatar"), Some(FileKind::Avatar));
        assert_eq!(FileKind::parse("archive"), None);
    }

    #[test]
    fn test_data_not_serialized() {
        let file = Model {
            id: 1,
            owner_id: 1,
            name: "brief.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 4,
            data: "AAAA".to_string(),
            kind: "document".to_string(),
            uploaded_at: 0,
        };
        let json = serde_json::to_value(&file).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["name"], "brief.pdf");
    }
}
