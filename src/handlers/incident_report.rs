//! Incident report handlers
//!
//! Staff file reports; HR reviews and closes them. New reports are
//! forwarded to the HR inbox.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entity::incident_report::{self, IncidentCategory, IncidentStatus};
use crate::entity::user;
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::state::AppState;

const ACT_CREATE_REPORT: &str = "file incident report";
const ACT_REVIEW_REPORT: &str = "review incident report";
const ACT_DELETE_REPORT: &str = "delete incident report";

/// Create request body
#[derive(Debug, Deserialize)]
pub struct CreateReportBody {
    pub category: String,
    pub description: String,
    #[serde(rename = "occurredOn")]
    pub occurred_on: String,
}

/// Review body
#[derive(Debug, Deserialize)]
pub struct ReviewReportBody {
    /// "in_review" or "closed"
    pub status: String,
    pub resolution: Option<String>,
}

/// Report with reporter name
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: i64,
    #[serde(rename = "reporterId")]
    pub reporter_id: i64,
    #[serde(rename = "reporterName")]
    pub reporter_name: String,
    pub category: String,
    pub description: String,
    #[serde(rename = "occurredOn")]
    pub occurred_on: String,
    pub status: String,
    #[serde(rename = "reviewedBy")]
    pub reviewed_by: Option<i64>,
    pub resolution: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl ReportResponse {
    fn from_model(m: incident_report::Model, reporter_name: String) -> Self {
        Self {
            id: m.id,
            reporter_id: m.reporter_id,
            reporter_name,
            category: m.category,
            description: m.description,
            occurred_on: m.occurred_on,
            status: m.status,
            reviewed_by: m.reviewed_by,
            resolution: m.resolution,
            created_at: m.created_at,
        }
    }
}

/// GET /api/incident-reports
pub async fn list_reports(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<ReportResponse>>>> {
    let mut find =
        incident_report::Entity::find().order_by_desc(incident_report::Column::CreatedAt);

    // Regular staff only see their own reports
    if !current_user.can_manage_hr() {
        find = find.filter(incident_report::Column::ReporterId.eq(current_user.id));
    }

    let rows = find.all(&*db).await?;

    let mut response = Vec::with_capacity(rows.len());
    for r in rows {
        let reporter_name = match user::Entity::find_by_id(r.reporter_id).one(&*db).await {
            Ok(Some(u)) => u.full_name,
            _ => String::new(),
        };
        response.push(ReportResponse::from_model(r, reporter_name));
    }

    Ok(Json(ApiResponse::success(response)))
}

/// POST /api/incident-reports
pub async fn create_report(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateReportBody>,
) -> AppResult<Json<ApiResponse<incident_report::Model>>> {
    let Some(category) = IncidentCategory::parse(&req.category) else {
        return Err(AppError::Validation(format!("unknown category: {}", req.category)));
    };
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }
    if NaiveDate::parse_from_str(&req.occurred_on, "%Y-%m-%d").is_err() {
        return Err(AppError::Validation(format!("invalid date: {}", req.occurred_on)));
    }

    let new_report = incident_report::ActiveModel {
        reporter_id: Set(current_user.id),
        category: Set(category.as_str().to_string()),
        description: Set(req.description.clone()),
        occurred_on: Set(req.occurred_on),
        status: Set(IncidentStatus::Open.as_str().to_string()),
        reviewed_by: Set(None),
        resolution: Set(None),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };
    let created = new_report.insert(&*db).await?;

    // Forward to the HR inbox; a failed send never fails the report
    if let Some(hr_inbox) = state.mailer.hr_inbox() {
        let subject = format!("New {} incident report", category.as_str());
        let body = format!(
            "{} filed a new {} incident report.\n\n{}\n",
            current_user.full_name,
            category.as_str(),
            req.description
        );
        if let Err(e) = state.mailer.send(hr_inbox, &subject, &body).await {
            tracing::warn!("Failed to forward incident report to HR: {}", e);
        }
    }

    let detail = format!("category: {}", category.as_str());
    log_activity(&current_user.email, ACT_CREATE_REPORT, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(created)))
}

/// PUT /api/incident-reports/:id
pub async fn review_report(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewReportBody>,
) -> AppResult<Json<ApiResponse<incident_report::Model>>> {
    if !current_user.can_manage_hr() {
        return Err(AppError::Forbidden);
    }

    let new_status = match IncidentStatus::parse(&req.status) {
        Some(IncidentStatus::InReview) => IncidentStatus::InReview,
        Some(IncidentStatus::Closed) => IncidentStatus::Closed,
        _ => {
            return Err(AppError::Validation(
                "status must be in_review or closed".to_string(),
            ))
        }
    };

    let existing = incident_report::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("incident report not found")?;

    if existing.status() == Some(IncidentStatus::Closed) {
        return Err(AppError::Conflict("report is already closed".to_string()));
    }

    let mut update: incident_report::ActiveModel = existing.into();
    update.status = Set(new_status.as_str().to_string());
    update.reviewed_by = Set(Some(current_user.id));
    if req.resolution.is_some() {
        update.resolution = Set(req.resolution);
    }
    let updated = update.update(&*db).await?;

    let detail = format!("report id: {}, status: {}", id, new_status.as_str());
    log_activity(&current_user.email, ACT_REVIEW_REPORT, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/incident-reports/:id
pub async fn delete_report(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    incident_report::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("incident report not found")?;

    incident_report::Entity::delete_by_id(id).exec(&*db).await?;

    let detail = format!("report id: {}", id);
    log_activity(&current_user.email, ACT_DELETE_REPORT, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("report deleted")))
}
