//! File handlers
//!
//! Documents live in the database as base64-encoded blobs; the download
//! handler decodes and serves the raw bytes.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use base64::Engine;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entity::user_file::{self, FileKind};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::state::AppState;

const ACT_UPLOAD_FILE: &str = "upload file";
const ACT_DELETE_FILE: &str = "delete file";

/// List filter (admin only)
#[derive(Debug, Deserialize)]
pub struct FileListQuery {
    pub owner: Option<i64>,
}

/// File metadata response (content is never included)
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: i64,
    #[serde(rename = "ownerId")]
    pub owner_id: i64,
    pub name: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub size: i64,
    pub kind: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: i64,
}

impl From<user_file::Model> for FileResponse {
    fn from(m: user_file::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            name: m.name,
            content_type: m.content_type,
            size: m.size,
            kind: m.kind,
            uploaded_at: m.uploaded_at,
        }
    }
}

/// GET /api/files
pub async fn list_files(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<FileListQuery>,
) -> AppResult<Json<ApiResponse<Vec<FileResponse>>>> {
    let owner = match query.owner {
        Some(owner) if current_user.is_admin() => owner,
        Some(_) => return Err(AppError::Forbidden),
        None => current_user.id,
    };

    let files = user_file::Entity::find()
        .filter(user_file::Column::OwnerId.eq(owner))
        .filter(user_file::Column::Kind.eq(FileKind::Document.as_str()))
        .order_by_desc(user_file::Column::UploadedAt)
        .all(&*db)
        .await?
        .into_iter()
        .map(FileResponse::from)
        .collect();

    Ok(Json(ApiResponse::success(files)))
}

/// POST /api/files
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<FileResponse>>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name = String::new();
    let mut content_type = "application/octet-stream".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                file_name = name.to_string();
            }
            if let Some(ct) = field.content_type() {
                content_type = ct.to_string();
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read file: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;
    if file_name.is_empty() {
        return Err(AppError::Validation("file name is required".to_string()));
    }
    if file_data.is_empty() {
        return Err(AppError::Validation("file is empty".to_string()));
    }
    if file_data.len() > state.config.max_upload_size {
        return Err(AppError::PayloadTooLarge(format!(
            "file exceeds the {} byte limit",
            state.config.max_upload_size
        )));
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(&file_data);
    let new_file = user_file::ActiveModel {
        owner_id: Set(current_user.id),
        name: Set(file_name.clone()),
        content_type: Set(content_type),
        size: Set(file_data.len() as i64),
        data: Set(encoded),
        kind: Set(FileKind::Document.as_str().to_string()),
        uploaded_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };
    let created = new_file.insert(&*db).await?;

    let detail = format!("file: {}", file_name);
    log_activity(&current_user.email, ACT_UPLOAD_FILE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(FileResponse::from(created))))
}

/// GET /api/files/:id
pub async fn download_file(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let file = user_file::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("file not found")?;

    if file.owner_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&file.data)
        .map_err(|e| AppError::Internal(format!("stored file is corrupt: {}", e)))?;

    let disposition = format!("attachment; filename=\"{}\"", file.name.replace('"', ""));
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(response)
}

/// DELETE /api/files/:id
pub async fn delete_file(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let file = user_file::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("file not found")?;

    if file.owner_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    user_file::Entity::delete_by_id(id).exec(&*db).await?;

    let detail = format!("file: {}", file.name);
    log_activity(&current_user.email, ACT_DELETE_FILE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("file deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_round_trip() {
        let original = b"IN THE MATTER OF the estate of ...";
        let encoded = base64::engine::general_purpose::STANDARD.encode(original);
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_corrupt_base64_rejected() {
        let result = base64::engine::general_purpose::STANDARD.decode("not base64!!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_disposition_strips_quotes() {
        let name = "weird\"name.pdf".replace('"', "");
        assert_eq!(name, "weirdname.pdf");
    }
}
