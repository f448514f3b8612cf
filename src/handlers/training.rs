//! Training module handlers
//!
//! Modules are authored by HR/admins and published to the whole firm.
//! Each module owns an ordered list of content sections.

use axum::{extract::Path, response::Json, Extension};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::{training_content, training_module};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;

const ACT_CREATE_MODULE: &str = "create training module";
const ACT_UPDATE_MODULE: &str = "update training module";
const ACT_DELETE_MODULE: &str = "delete training module";

/// Create/update module body
#[derive(Debug, Deserialize)]
pub struct ModuleBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub published: bool,
}

/// Content section body
#[derive(Debug, Deserialize)]
pub struct ContentBody {
    pub heading: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "videoUrl")]
    pub video_url: Option<String>,
    /// Defaults to the end of the module
    pub position: Option<i32>,
}

/// Module summary
#[derive(Debug, Serialize)]
pub struct ModuleResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub published: bool,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl From<training_module::Model> for ModuleResponse {
    fn from(m: training_module::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            category: m.category,
            published: m.published,
            author_id: m.author_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Content section response
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: i64,
    pub position: i32,
    pub heading: String,
    pub body: String,
    #[serde(rename = "videoUrl")]
    pub video_url: Option<String>,
}

impl From<training_content::Model> for ContentResponse {
    fn from(m: training_content::Model) -> Self {
        Self {
            id: m.id,
            position: m.position,
            heading: m.heading,
            body: m.body,
            video_url: m.video_url,
        }
    }
}

/// Module with its ordered sections
#[derive(Debug, Serialize)]
pub struct ModuleDetailResponse {
    #[serde(flatten)]
    pub module: ModuleResponse,
    pub content: Vec<ContentResponse>,
}

/// GET /api/training-modules
pub async fn list_modules(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<ModuleResponse>>>> {
    let mut find = training_module::Entity::find().order_by_asc(training_module::Column::Id);

    // Drafts are only visible to authors
    if !current_user.can_publish() {
        find = find.filter(training_module::Column::Published.eq(true));
    }

    let modules = find
        .all(&*db)
        .await?
        .into_iter()
        .map(ModuleResponse::from)
        .collect();

    Ok(Json(ApiResponse::success(modules)))
}

/// GET /api/training-modules/:id
pub async fn get_module(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ModuleDetailResponse>>> {
    let module = training_module::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("training module not found")?;

    // Unpublished modules read as missing for regular staff
    if !module.published && !current_user.can_publish() {
        return Err(AppError::NotFound("training module not found".to_string()));
    }

    let content = training_content::Entity::find()
        .filter(training_content::Column::ModuleId.eq(id))
        .order_by_asc(training_content::Column::Position)
        .order_by_asc(training_content::Column::Id)
        .all(&*db)
        .await?
        .into_iter()
        .map(ContentResponse::from)
        .collect();

    Ok(Json(ApiResponse::success(ModuleDetailResponse {
        module: ModuleResponse::from(module),
        content,
    })))
}

/// POST /api/training-modules
pub async fn create_module(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<ModuleBody>,
) -> AppResult<Json<ApiResponse<ModuleResponse>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let now = chrono::Utc::now().timestamp();
    let new_module = training_module::ActiveModel {
        title: Set(req.title.trim().to_string()),
        description: Set(req.description),
        category: Set(req.category),
        published: Set(req.published),
        author_id: Set(current_user.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_module.insert(&*db).await?;

    let detail = format!("module: {}", created.title);
    log_activity(&current_user.email, ACT_CREATE_MODULE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(ModuleResponse::from(created))))
}

/// PUT /api/training-modules/:id
pub async fn update_module(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ModuleBody>,
) -> AppResult<Json<ApiResponse<ModuleResponse>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let existing = training_module::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("training module not found")?;

    let mut update: training_module::ActiveModel = existing.into();
    update.title = Set(req.title.trim().to_string());
    update.description = Set(req.description);
    update.category = Set(req.category);
    update.published = Set(req.published);
    update.updated_at = Set(chrono::Utc::now().timestamp());
    let updated = update.update(&*db).await?;

    let detail = format!("module: {}", updated.title);
    log_activity(&current_user.email, ACT_UPDATE_MODULE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(ModuleResponse::from(updated))))
}

/// DELETE /api/training-modules/:id
pub async fn delete_module(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }

    let existing = training_module::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("training module not found")?;

    training_content::Entity::delete_many()
        .filter(training_content::Column::ModuleId.eq(id))
        .exec(&*db)
        .await?;
    training_module::Entity::delete_by_id(id).exec(&*db).await?;

    let detail = format!("module: {}", existing.title);
    log_activity(&current_user.email, ACT_DELETE_MODULE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("module deleted")))
}

/// POST /api/training-modules/:id/content
pub async fn add_content(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ContentBody>,
) -> AppResult<Json<ApiResponse<ContentResponse>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }
    if req.heading.trim().is_empty() {
        return Err(AppError::Validation("heading is required".to_string()));
    }

    let module = training_module::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("training module not found")?;

    let position = match req.position {
        Some(p) => p,
        None => {
            // Append after the current last section
            let last = training_content::Entity::find()
                .filter(training_content::Column::ModuleId.eq(id))
                .order_by_desc(training_content::Column::Position)
                .limit(1)
                .one(&*db)
                .await?;
            last.map(|c| c.position + 1).unwrap_or(0)
        }
    };

    let new_content = training_content::ActiveModel {
        module_id: Set(id),
        position: Set(position),
        heading: Set(req.heading.trim().to_string()),
        body: Set(req.body),
        video_url: Set(req.video_url),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };
    let created = new_content.insert(&*db).await?;

    touch_module(&db, module).await?;

    Ok(Json(ApiResponse::success(ContentResponse::from(created))))
}

/// PUT /api/training-modules/:id/content/:content_id
pub async fn update_content(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, content_id)): Path<(i64, i64)>,
    Json(req): Json<ContentBody>,
) -> AppResult<Json<ApiResponse<ContentResponse>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }
    if req.heading.trim().is_empty() {
        return Err(AppError::Validation("heading is required".to_string()));
    }

    let module = training_module::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("training module not found")?;

    let existing = training_content::Entity::find_by_id(content_id)
        .one(&*db)
        .await?
        .ok_or_not_found("content section not found")?;
    if existing.module_id != id {
        return Err(AppError::NotFound("content section not found".to_string()));
    }

    let mut update: training_content::ActiveModel = existing.into();
    update.heading = Set(req.heading.trim().to_string());
    update.body = Set(req.body);
    update.video_url = Set(req.video_url);
    if let Some(position) = req.position {
        update.position = Set(position);
    }
    let updated = update.update(&*db).await?;

    touch_module(&db, module).await?;

    Ok(Json(ApiResponse::success(ContentResponse::from(updated))))
}

/// DELETE /api/training-modules/:id/content/:content_id
pub async fn delete_content(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, content_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }

    let module = training_module::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("training module not found")?;

    let existing = training_content::Entity::find_by_id(content_id)
        .one(&*db)
        .await?
        .ok_or_not_found("content section not found")?;
    if existing.module_id != id {
        return Err(AppError::NotFound("content section not found".to_string()));
    }

    training_content::Entity::delete_by_id(content_id).exec(&*db).await?;

    touch_module(&db, module).await?;

    Ok(Json(ApiResponse::success_msg("content section deleted")))
}

/// Content edits bump the module's updated_at
async fn touch_module(
    db: &sea_orm::DatabaseConnection,
    module: training_module::Model,
) -> AppResult<()> {
    let mut update: training_module::ActiveModel = module.into();
    update.updated_at = Set(chrono::Utc::now().timestamp());
    update.update(db).await?;
    Ok(())
}
