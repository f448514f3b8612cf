//! News handlers

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entity::{news, user};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;

const ACT_CREATE_NEWS: &str = "publish news";
const ACT_UPDATE_NEWS: &str = "update news";
const ACT_DELETE_NEWS: &str = "delete news";

/// Pagination parameters
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(rename = "pageSize", default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

/// Create/update body
#[derive(Debug, Deserialize)]
pub struct NewsBody {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub pinned: bool,
}

/// News item with author name
#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    #[serde(rename = "authorName")]
    pub author_name: String,
    pub pinned: bool,
    #[serde(rename = "publishedAt")]
    pub published_at: i64,
}

impl NewsResponse {
    fn from_model(m: news::Model, author_name: String) -> Self {
        Self {
            id: m.id,
            title: m.title,
            body: m.body,
            author_id: m.author_id,
            author_name,
            pinned: m.pinned,
            published_at: m.published_at,
        }
    }
}

/// Page of news items
#[derive(Debug, Serialize)]
pub struct NewsPage {
    pub items: Vec<NewsResponse>,
    pub total: u64,
}

async fn author_name(db: &sea_orm::DatabaseConnection, id: i64) -> String {
    match user::Entity::find_by_id(id).one(db).await {
        Ok(Some(u)) => u.full_name,
        _ => String::new(),
    }
}

/// GET /api/news
pub async fn list_news(
    Extension(db): Extension<DbConn>,
    Query(query): Query<NewsQuery>,
) -> AppResult<Json<ApiResponse<NewsPage>>> {
    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 50);
    let offset = (page - 1) * page_size;

    // Pinned items first, then newest first
    let rows = news::Entity::find()
        .order_by_desc(news::Column::Pinned)
        .order_by_desc(news::Column::PublishedAt)
        .offset(offset)
        .limit(page_size)
        .all(&*db)
        .await?;

    let total = news::Entity::find().count(&*db).await?;

    let mut items = Vec::with_capacity(rows.len());
    for n in rows {
        let name = author_name(&db, n.author_id).await;
        items.push(NewsResponse::from_model(n, name));
    }

    Ok(Json(ApiResponse::success(NewsPage { items, total })))
}

/// GET /api/news/:id
pub async fn get_news(
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<NewsResponse>>> {
    let item = news::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("news item not found")?;

    let name = author_name(&db, item.author_id).await;
    Ok(Json(ApiResponse::success(NewsResponse::from_model(item, name))))
}

/// POST /api/news
pub async fn create_news(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<NewsBody>,
) -> AppResult<Json<ApiResponse<NewsResponse>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }
    if req.title.trim().is_empty() || req.body.trim().is_empty() {
        return Err(AppError::Validation("title and body are required".to_string()));
    }

    let new_item = news::ActiveModel {
        title: Set(req.title.trim().to_string()),
        body: Set(req.body),
        author_id: Set(current_user.id),
        pinned: Set(req.pinned),
        published_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };
    let created = new_item.insert(&*db).await?;

    let detail = format!("title: {}", created.title);
    log_activity(&current_user.email, ACT_CREATE_NEWS, &detail, RESULT_OK, None);

    let name = current_user.full_name.clone();
    Ok(Json(ApiResponse::success(NewsResponse::from_model(created, name))))
}

/// PUT /api/news/:id
pub async fn update_news(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<NewsBody>,
) -> AppResult<Json<ApiResponse<NewsResponse>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }
    if req.title.trim().is_empty() || req.body.trim().is_empty() {
        return Err(AppError::Validation("title and body are required".to_string()));
    }

    let existing = news::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("news item not found")?;

    let mut update: news::ActiveModel = existing.into();
    update.title = Set(req.title.trim().to_string());
    update.body = Set(req.body);
    update.pinned = Set(req.pinned);
    let updated = update.update(&*db).await?;

    let detail = format!("title: {}", updated.title);
    log_activity(&current_user.email, ACT_UPDATE_NEWS, &detail, RESULT_OK, None);

    let name = author_name(&db, updated.author_id).await;
    Ok(Json(ApiResponse::success(NewsResponse::from_model(updated, name))))
}

/// DELETE /api/news/:id
pub async fn delete_news(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.can_publish() {
        return Err(AppError::Forbidden);
    }

    let existing = news::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("news item not found")?;

    news::Entity::delete_by_id(id).exec(&*db).await?;

    let detail = format!("title: {}", existing.title);
    log_activity(&current_user.email, ACT_DELETE_NEWS, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("news item deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let query: NewsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
    }

    #[test]
    fn test_page_size_clamped() {
        let query: NewsQuery =
            serde_json::from_str(r#"{"page": 0, "pageSize": 500}"#).unwrap();
        assert_eq!(query.page.max(1), 1);
        assert_eq!(query.page_size.clamp(1, 50), 50);
    }
}
