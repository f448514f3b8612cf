//! User handlers
//!
//! User CRUD, password changes, and profile avatars.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use base64::Engine;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::user::{self, Role, UserStatus};
use crate::entity::{paralegal, user_file};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::state::AppState;

const ACT_CREATE_USER: &str = "create user";
const ACT_UPDATE_USER: &str = "update user";
const ACT_DELETE_USER: &str = "delete user";
const ACT_SET_STATUS: &str = "set user status";
const ACT_CHANGE_PASSWORD: &str = "change password";

const MIN_PASSWORD_LEN: usize = 8;

/// Sanitized user response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub title: Option<String>,
    pub status: i32,
    #[serde(rename = "lastLogin")]
    pub last_login: i64,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            full_name: m.full_name,
            phone: m.phone,
            role: m.role,
            title: m.title,
            status: m.status,
            last_login: m.last_login,
            created_at: m.created_at,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub title: Option<String>,
}

/// Update user request
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    /// Admin only
    pub role: Option<String>,
}

/// Enable/disable request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: i32,
}

/// Change password request (user changes their own password)
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Minimal email shape check; the mail server is the real validator
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// GET /api/users
pub async fn list_users(
    Extension(db): Extension<DbConn>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&*db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(ApiResponse::success(users)))
}

/// GET /api/users/:id
pub async fn get_user(
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let u = user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("user not found")?;

    Ok(Json(ApiResponse::success(UserResponse::from(u))))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if !current_user.can_manage_users() {
        return Err(AppError::Forbidden);
    }

    if !is_valid_email(&req.email) {
        return Err(AppError::Validation("invalid email address".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full name is required".to_string()));
    }
    let Some(role) = Role::parse(&req.role) else {
        return Err(AppError::Validation(format!("unknown role: {}", req.role)));
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("email already in use".to_string()));
    }

    let hashed_password = bcrypt::hash(&req.password, 12)?;
    let now = chrono::Utc::now().timestamp();

    let new_user = user::ActiveModel {
        email: Set(req.email.clone()),
        password: Set(hashed_password),
        full_name: Set(req.full_name.clone()),
        phone: Set(req.phone),
        role: Set(role.as_str().to_string()),
        title: Set(req.title),
        status: Set(UserStatus::Inactive.into()),
        last_login: Set(0),
        created_at: Set(now),
        ..Default::default()
    };

    let created = new_user.insert(&*db).await?;

    // Welcome email is best-effort
    let body = format!(
        "Hello {},\n\nAn account has been created for you on the firm intranet.\n\
         Sign in with this email address to get started.\n",
        req.full_name
    );
    if let Err(e) = state
        .mailer
        .send(&req.email, "Welcome to the firm intranet", &body)
        .await
    {
        tracing::warn!("Failed to send welcome email to {}: {}", req.email, e);
    }

    let detail = format!("email: {}, role: {}", req.email, role.as_str());
    log_activity(&current_user.email, ACT_CREATE_USER, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(UserResponse::from(created))))
}

/// PUT /api/users/:id
pub async fn update_user(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    // Non-admins may only edit their own profile, and never their role
    if !current_user.can_manage_users() {
        if id != current_user.id {
            return Err(AppError::Forbidden);
        }
        if req.role.is_some() {
            return Err(AppError::Forbidden);
        }
    }

    let existing = user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("user not found")?;

    let role = match req.role.as_deref() {
        Some(r) => Role::parse(r)
            .ok_or_else(|| AppError::Validation(format!("unknown role: {}", r)))?
            .as_str()
            .to_string(),
        None => existing.role.clone(),
    };

    let email = match req.email {
        Some(new_email) if new_email != existing.email => {
            if !is_valid_email(&new_email) {
                return Err(AppError::Validation("invalid email address".to_string()));
            }
            let taken = user::Entity::find()
                .filter(user::Column::Email.eq(&new_email))
                .one(&*db)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("email already in use".to_string()));
            }
            new_email
        }
        _ => existing.email.clone(),
    };

    let mut update: user::ActiveModel = existing.clone().into();
    update.email = Set(email.clone());
    update.role = Set(role);
    if let Some(full_name) = req.full_name {
        if full_name.trim().is_empty() {
            return Err(AppError::Validation("full name is required".to_string()));
        }
        update.full_name = Set(full_name);
    }
    if req.phone.is_some() {
        update.phone = Set(req.phone);
    }
    if req.title.is_some() {
        update.title = Set(req.title);
    }

    let updated = update.update(&*db).await?;

    let detail = format!("email: {}", email);
    log_activity(&current_user.email, ACT_UPDATE_USER, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(UserResponse::from(updated))))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.can_manage_users() {
        return Err(AppError::Forbidden);
    }
    if id == current_user.id {
        return Err(AppError::BadRequest("cannot delete your own account".to_string()));
    }

    let existing = user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("user not found")?;

    user::Entity::delete_by_id(id).exec(&*db).await?;

    // Remove dependent rows the user owns outright
    user_file::Entity::delete_many()
        .filter(user_file::Column::OwnerId.eq(id))
        .exec(&*db)
        .await?;
    paralegal::Entity::delete_many()
        .filter(paralegal::Column::UserId.eq(id))
        .exec(&*db)
        .await?;

    let detail = format!("email: {}", existing.email);
    log_activity(&current_user.email, ACT_DELETE_USER, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("user deleted")))
}

/// PUT /api/users/:id/status
pub async fn set_user_status(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.can_manage_users() {
        return Err(AppError::Forbidden);
    }

    let status = match req.status {
        1 => UserStatus::Active,
        2 => UserStatus::Disabled,
        _ => {
            return Err(AppError::Validation(
                "status must be 1 (active) or 2 (disabled)".to_string(),
            ))
        }
    };
    if id == current_user.id && status == UserStatus::Disabled {
        return Err(AppError::BadRequest("cannot disable your own account".to_string()));
    }

    let existing = user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("user not found")?;

    let mut update: user::ActiveModel = existing.clone().into();
    update.status = Set(status.into());
    update.update(&*db).await?;

    let detail = format!("email: {}, status: {}", existing.email, req.status);
    log_activity(&current_user.email, ACT_SET_STATUS, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("status updated")))
}

/// POST /api/users/password
pub async fn change_password(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    if req.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let db_user = user::Entity::find_by_id(current_user.id)
        .one(&*db)
        .await?
        .ok_or_not_found("user not found")?;

    if !bcrypt::verify(&req.old_password, &db_user.password).unwrap_or(false) {
        return Err(AppError::Validation("old password is incorrect".to_string()));
    }

    let new_hash = bcrypt::hash(&req.new_password, 12)?;

    let mut update: user::ActiveModel = db_user.into();
    update.password = Set(new_hash);
    update.update(&*db).await?;

    log_activity(&current_user.email, ACT_CHANGE_PASSWORD, "", RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("password changed")))
}

/// GET /api/users/:id/avatar
pub async fn get_avatar(
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("user not found")?;

    let stored = user_file::Entity::find()
        .filter(user_file::Column::OwnerId.eq(id))
        .filter(user_file::Column::Kind.eq(user_file::FileKind::Avatar.as_str()))
        .order_by_desc(user_file::Column::Id)
        .one(&*db)
        .await?;

    let (bytes, content_type) = match stored {
        Some(file) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&file.data)
                .map_err(|e| AppError::Internal(format!("stored avatar is corrupt: {}", e)))?;
            (bytes, file.content_type)
        }
        None => (placeholder_avatar(id), "image/png".to_string()),
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(response)
}

/// POST /api/users/avatar
pub async fn upload_avatar(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut avatar_data: Option<Vec<u8>> = None;
    let mut content_type = "image/png".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("avatar") {
            if let Some(ct) = field.content_type() {
                content_type = ct.to_string();
            }
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read avatar: {}", e)))?;
            avatar_data = Some(bytes.to_vec());
        }
    }

    let avatar_data = avatar_data
        .ok_or_else(|| AppError::BadRequest("missing avatar field".to_string()))?;
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation("avatar must be an image".to_string()));
    }

    // Replace any previous avatar
    user_file::Entity::delete_many()
        .filter(user_file::Column::OwnerId.eq(current_user.id))
        .filter(user_file::Column::Kind.eq(user_file::FileKind::Avatar.as_str()))
        .exec(&*db)
        .await?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&avatar_data);
    let new_file = user_file::ActiveModel {
        owner_id: Set(current_user.id),
        name: Set("avatar".to_string()),
        content_type: Set(content_type),
        size: Set(avatar_data.len() as i64),
        data: Set(encoded),
        kind: Set(user_file::FileKind::Avatar.as_str().to_string()),
        uploaded_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };
    new_file.insert(&*db).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "url": format!("/api/users/{}/avatar", current_user.id)
    }))))
}

/// Deterministic solid-color placeholder avatar for users without one
fn placeholder_avatar(user_id: i64) -> Vec<u8> {
    // Spread the id bits so adjacent ids get unrelated colors
    let seed = (user_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let r = ((seed >> 16) & 0xFF) as u8;
    let g = ((seed >> 8) & 0xFF) as u8;
    let b = (seed & 0xFF) as u8;

    create_solid_color_png(150, 150, r, g, b)
}

/// Create a minimal PNG with solid color
fn create_solid_color_png(width: u32, height: u32, r: u8, g: u8, b: u8) -> Vec<u8> {
    use std::io::Write;

    // PNG signature
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    // IHDR chunk
    let mut ihdr = Vec::new();
    ihdr.write_all(&width.to_be_bytes()).unwrap();
    ihdr.write_all(&height.to_be_bytes()).unwrap();
    ihdr.push(8); // bit depth
    ihdr.push(2); // color type (RGB)
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace

    write_png_chunk(&mut data, b"IHDR", &ihdr);

    // IDAT chunk (image data)
    let mut raw_data = Vec::new();
    for _ in 0..height {
        raw_data.push(0); // filter byte
        for _ in 0..width {
            raw_data.push(r);
            raw_data.push(g);
            raw_data.push(b);
        }
    }

    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw_data, 6);
    write_png_chunk(&mut data, b"IDAT", &compressed);

    // IEND chunk
    write_png_chunk(&mut data, b"IEND", &[]);

    data
}

/// Write a PNG chunk
fn write_png_chunk(data: &mut Vec<u8>, chunk_type: &[u8; 4], chunk_data: &[u8]) {
    use std::io::Write;

    data.write_all(&(chunk_data.len() as u32).to_be_bytes()).unwrap();
    data.write_all(chunk_type).unwrap();
    data.write_all(chunk_data).unwrap();

    let mut crc_data = chunk_type.to_vec();
    crc_data.extend_from_slice(chunk_data);
    let crc = crc32fast::hash(&crc_data);
    data.write_all(&crc.to_be_bytes()).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("jane@firm.example"));
        assert!(is_valid_email("j.doe@firm.co.uk"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("@firm.example"));
        assert!(!is_valid_email("jane@nodot"));
        assert!(!is_valid_email("jane@.example"));
        assert!(!is_valid_email("jane@example."));
    }

    #[test]
    fn test_password_hash_round_trip() {
        // Low cost keeps the test fast; handlers use cost 12
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        assert!(bcrypt::verify("correct horse", &hash).unwrap());
        assert!(!bcrypt::verify("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_placeholder_avatar_is_png() {
        let png = placeholder_avatar(7);
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_placeholder_avatar_deterministic() {
        assert_eq!(placeholder_avatar(7), placeholder_avatar(7));
        assert_ne!(placeholder_avatar(7), placeholder_avatar(8));
    }

    #[test]
    fn test_user_response_serialization() {
        let resp = UserResponse {
            id: 1,
            email: "jane@firm.example".to_string(),
            full_name: "Jane Doe".to_string(),
            phone: None,
            role: "attorney".to_string(),
            title: Some("Senior Associate".to_string()),
            status: 1,
            last_login: 1700000000,
            created_at: 1690000000,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["lastLogin"], 1700000000);
        assert!(json.get("password").is_none());
    }
}
