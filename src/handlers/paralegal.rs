//! Paralegal roster handlers

use axum::{extract::Path, response::Json, Extension};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entity::user::{self, Role};
use crate::entity::paralegal;
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;

const ACT_CREATE_PARALEGAL: &str = "create paralegal profile";
const ACT_UPDATE_PARALEGAL: &str = "update paralegal profile";
const ACT_DELETE_PARALEGAL: &str = "delete paralegal profile";

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreateParalegalRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "supervisingAttorneyId")]
    pub supervising_attorney_id: i64,
    #[serde(rename = "practiceArea")]
    pub practice_area: String,
}

/// Update request
#[derive(Debug, Deserialize)]
pub struct UpdateParalegalRequest {
    #[serde(rename = "supervisingAttorneyId")]
    pub supervising_attorney_id: Option<i64>,
    #[serde(rename = "practiceArea")]
    pub practice_area: Option<String>,
    pub active: Option<bool>,
}

/// Roster entry with joined names
#[derive(Debug, Serialize)]
pub struct ParalegalResponse {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "supervisingAttorneyId")]
    pub supervising_attorney_id: i64,
    #[serde(rename = "supervisingAttorneyName")]
    pub supervising_attorney_name: String,
    #[serde(rename = "practiceArea")]
    pub practice_area: String,
    pub active: bool,
}

async fn full_name(db: &sea_orm::DatabaseConnection, id: i64) -> String {
    match user::Entity::find_by_id(id).one(db).await {
        Ok(Some(u)) => u.full_name,
        _ => String::new(),
    }
}

/// Verify the supervising attorney exists and holds the attorney role
async fn check_supervisor(db: &sea_orm::DatabaseConnection, id: i64) -> AppResult<()> {
    let supervisor = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_not_found("supervising attorney not found")?;
    if supervisor.role() != Some(Role::Attorney) {
        return Err(AppError::Validation(
            "supervising attorney must hold the attorney role".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/paralegals
pub async fn list_paralegals(
    Extension(db): Extension<DbConn>,
) -> AppResult<Json<ApiResponse<Vec<ParalegalResponse>>>> {
    let rows = paralegal::Entity::find()
        .order_by_asc(paralegal::Column::Id)
        .all(&*db)
        .await?;

    let mut response = Vec::with_capacity(rows.len());
    for p in rows {
        let user_name = full_name(&db, p.user_id).await;
        let supervising_attorney_name = full_name(&db, p.supervising_attorney_id).await;
        response.push(ParalegalResponse {
            id: p.id,
            user_id: p.user_id,
            user_name,
            supervising_attorney_id: p.supervising_attorney_id,
            supervising_attorney_name,
            practice_area: p.practice_area,
            active: p.active,
        });
    }

    Ok(Json(ApiResponse::success(response)))
}

/// POST /api/paralegals
pub async fn create_paralegal(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateParalegalRequest>,
) -> AppResult<Json<ApiResponse<paralegal::Model>>> {
    if !current_user.can_manage_hr() {
        return Err(AppError::Forbidden);
    }

    if req.practice_area.trim().is_empty() {
        return Err(AppError::Validation("practice area is required".to_string()));
    }

    let member = user::Entity::find_by_id(req.user_id)
        .one(&*db)
        .await?
        .ok_or_not_found("user not found")?;

    let existing = paralegal::Entity::find()
        .filter(paralegal::Column::UserId.eq(req.user_id))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("user already has a paralegal profile".to_string()));
    }

    check_supervisor(&db, req.supervising_attorney_id).await?;

    let new_profile = paralegal::ActiveModel {
        user_id: Set(req.user_id),
        supervising_attorney_id: Set(req.supervising_attorney_id),
        practice_area: Set(req.practice_area.trim().to_string()),
        active: Set(true),
        ..Default::default()
    };
    let created = new_profile.insert(&*db).await?;

    let detail = format!("user: {}", member.email);
    log_activity(&current_user.email, ACT_CREATE_PARALEGAL, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(created)))
}

/// PUT /api/paralegals/:id
pub async fn update_paralegal(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateParalegalRequest>,
) -> AppResult<Json<ApiResponse<paralegal::Model>>> {
    if !current_user.can_manage_hr() {
        return Err(AppError::Forbidden);
    }

    let existing = paralegal::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("paralegal profile not found")?;

    if let Some(supervisor_id) = req.supervising_attorney_id {
        check_supervisor(&db, supervisor_id).await?;
    }

    let mut update: paralegal::ActiveModel = existing.into();
    if let Some(supervisor_id) = req.supervising_attorney_id {
        update.supervising_attorney_id = Set(supervisor_id);
    }
    if let Some(practice_area) = req.practice_area {
        if practice_area.trim().is_empty() {
            return Err(AppError::Validation("practice area is required".to_string()));
        }
        update.practice_area = Set(practice_area.trim().to_string());
    }
    if let Some(active) = req.active {
        update.active = Set(active);
    }

    let updated = update.update(&*db).await?;

    let detail = format!("profile id: {}", id);
    log_activity(&current_user.email, ACT_UPDATE_PARALEGAL, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/paralegals/:id
pub async fn delete_paralegal(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.can_manage_hr() {
        return Err(AppError::Forbidden);
    }

    paralegal::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("paralegal profile not found")?;

    paralegal::Entity::delete_by_id(id).exec(&*db).await?;

    let detail = format!("profile id: {}", id);
    log_activity(&current_user.email, ACT_DELETE_PARALEGAL, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("paralegal profile deleted")))
}
