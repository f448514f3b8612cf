//! Activity log handlers
//!
//! Query and prune the firm-wide activity log.

use axum::{extract::Query, response::Json, Extension};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::entity::activity_log;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;

/// Query parameters for log pagination
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(rename = "pageSize", default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

/// Activity log entry response
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub id: i64,
    pub ts: i64,
    pub actor: String,
    pub action: String,
    pub detail: String,
    pub result: String,
    pub ip: Option<String>,
}

impl From<activity_log::Model> for ActivityResponse {
    fn from(m: activity_log::Model) -> Self {
        Self {
            id: m.id,
            ts: m.ts,
            actor: m.actor,
            action: m.action,
            detail: m.detail,
            result: m.result,
            ip: m.ip,
        }
    }
}

/// Query response with pagination
#[derive(Debug, Serialize)]
pub struct ActivityPage {
    pub entries: Vec<ActivityResponse>,
    pub total: u64,
}

/// GET /api/activity
pub async fn query_activity(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<ApiResponse<ActivityPage>>> {
    if !current_user.can_view_activity() {
        return Err(AppError::Forbidden);
    }

    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);
    let offset = (page - 1) * page_size;

    let entries = activity_log::Entity::find()
        .order_by_desc(activity_log::Column::Id)
        .offset(offset)
        .limit(page_size)
        .all(&*db)
        .await?
        .into_iter()
        .map(ActivityResponse::from)
        .collect();

    let total = activity_log::Entity::find().count(&*db).await?;

    Ok(Json(ApiResponse::success(ActivityPage { entries, total })))
}

/// DELETE /api/activity
pub async fn delete_activity(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(ids): Json<Vec<i64>>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.can_view_activity() {
        return Err(AppError::Forbidden);
    }

    if ids.is_empty() {
        return Err(AppError::BadRequest("no ids provided".to_string()));
    }

    let result = activity_log::Entity::delete_many()
        .filter(activity_log::Column::Id.is_in(ids))
        .exec(&*db)
        .await?;

    Ok(Json(ApiResponse::success_msg(format!(
        "deleted {} entries",
        result.rows_affected
    ))))
}

/// Service for recording activity entries
pub mod service {
    use sea_orm::{ActiveModelTrait, Set};
    use tokio::sync::mpsc;

    use crate::entity::activity_log;

    pub const RESULT_OK: &str = "ok";
    pub const RESULT_FAILED: &str = "failed";

    /// Entry to be recorded
    #[derive(Debug, Clone)]
    pub struct ActivityEntry {
        pub actor: String,
        pub action: String,
        pub detail: String,
        pub result: String,
        pub ip: Option<String>,
    }

    /// Global log channel
    static LOG_TX: std::sync::OnceLock<mpsc::Sender<ActivityEntry>> = std::sync::OnceLock::new();

    /// Initialize the activity log service
    /// This function is idempotent - calling it multiple times is safe
    pub fn init(db: sea_orm::DatabaseConnection) {
        if LOG_TX.get().is_some() {
            tracing::debug!("Activity log service already initialized, skipping");
            return;
        }

        let (tx, mut rx) = mpsc::channel::<ActivityEntry>(200);
        if LOG_TX.set(tx).is_err() {
            tracing::debug!("Activity log service initialized by another thread");
            return;
        }

        // Background task drains the channel into the database
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let now = chrono::Utc::now().timestamp();
                let log = activity_log::ActiveModel {
                    ts: Set(now),
                    actor: Set(entry.actor),
                    action: Set(entry.action),
                    detail: Set(entry.detail),
                    result: Set(entry.result),
                    ip: Set(entry.ip),
                    ..Default::default()
                };

                if let Err(e) = log.insert(&db).await {
                    tracing::error!("Failed to record activity: {}", e);
                }
            }
        });
    }

    /// Queue an activity entry
    pub fn add_entry(entry: ActivityEntry) {
        if let Some(tx) = LOG_TX.get() {
            if tx.try_send(entry).is_err() {
                tracing::warn!("Activity channel is full, entry dropped");
            }
        } else {
            tracing::warn!(
                "Activity log service not initialized, entry dropped: {} - {}",
                entry.action,
                entry.detail
            );
        }
    }

    /// Record an activity entry from request context
    pub fn log_activity(actor: &str, action: &str, detail: &str, result: &str, ip: Option<&str>) {
        add_entry(ActivityEntry {
            actor: actor.to_string(),
            action: action.to_string(),
            detail: detail.to_string(),
            result: result.to_string(),
            ip: ip.map(|s| s.to_string()),
        });
    }
}
