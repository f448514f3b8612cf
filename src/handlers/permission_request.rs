//! Permission request handlers
//!
//! HR workflow: staff file requests, HR or an admin decides them, the
//! requester is notified by email.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entity::permission_request::{self, RequestStatus, RequestType};
use crate::entity::user;
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::state::AppState;

const ACT_CREATE_REQUEST: &str = "file permission request";
const ACT_DECIDE_REQUEST: &str = "decide permission request";
const ACT_DELETE_REQUEST: &str = "delete permission request";

/// Create request body
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    #[serde(rename = "requestType")]
    pub request_type: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub reason: String,
}

/// Decision body
#[derive(Debug, Deserialize)]
pub struct DecideRequestBody {
    /// "approved" or "denied"
    pub status: String,
    pub note: Option<String>,
}

/// Request with requester name
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub id: i64,
    #[serde(rename = "requesterId")]
    pub requester_id: i64,
    #[serde(rename = "requesterName")]
    pub requester_name: String,
    #[serde(rename = "requestType")]
    pub request_type: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub reason: String,
    pub status: String,
    #[serde(rename = "decidedBy")]
    pub decided_by: Option<i64>,
    #[serde(rename = "decidedAt")]
    pub decided_at: Option<i64>,
    #[serde(rename = "decisionNote")]
    pub decision_note: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl RequestResponse {
    fn from_model(m: permission_request::Model, requester_name: String) -> Self {
        Self {
            id: m.id,
            requester_id: m.requester_id,
            requester_name,
            request_type: m.request_type,
            start_date: m.start_date,
            end_date: m.end_date,
            reason: m.reason,
            status: m.status,
            decided_by: m.decided_by,
            decided_at: m.decided_at,
            decision_note: m.decision_note,
            created_at: m.created_at,
        }
    }
}

/// Parse a YYYY-MM-DD date
fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {}", value)))
}

/// GET /api/permission-requests
pub async fn list_requests(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<RequestResponse>>>> {
    let mut find = permission_request::Entity::find()
        .order_by_desc(permission_request::Column::CreatedAt);

    // Regular staff only see their own requests
    if !current_user.can_manage_hr() {
        find = find.filter(permission_request::Column::RequesterId.eq(current_user.id));
    }

    let rows = find.all(&*db).await?;

    let mut response = Vec::with_capacity(rows.len());
    for r in rows {
        let requester_name = match user::Entity::find_by_id(r.requester_id).one(&*db).await {
            Ok(Some(u)) => u.full_name,
            _ => String::new(),
        };
        response.push(RequestResponse::from_model(r, requester_name));
    }

    Ok(Json(ApiResponse::success(response)))
}

/// POST /api/permission-requests
pub async fn create_request(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateRequestBody>,
) -> AppResult<Json<ApiResponse<permission_request::Model>>> {
    let Some(request_type) = RequestType::parse(&req.request_type) else {
        return Err(AppError::Validation(format!(
            "unknown request type: {}",
            req.request_type
        )));
    };
    if req.reason.trim().is_empty() {
        return Err(AppError::Validation("reason is required".to_string()));
    }

    let start = parse_date(&req.start_date)?;
    if let Some(end_date) = &req.end_date {
        let end = parse_date(end_date)?;
        if end < start {
            return Err(AppError::Validation(
                "end date must not precede start date".to_string(),
            ));
        }
    }

    let new_request = permission_request::ActiveModel {
        requester_id: Set(current_user.id),
        request_type: Set(request_type.as_str().to_string()),
        start_date: Set(req.start_date),
        end_date: Set(req.end_date),
        reason: Set(req.reason),
        status: Set(RequestStatus::Pending.as_str().to_string()),
        decided_by: Set(None),
        decided_at: Set(None),
        decision_note: Set(None),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };
    let created = new_request.insert(&*db).await?;

    let detail = format!("type: {}", request_type.as_str());
    log_activity(&current_user.email, ACT_CREATE_REQUEST, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(created)))
}

/// PUT /api/permission-requests/:id
pub async fn decide_request(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<DecideRequestBody>,
) -> AppResult<Json<ApiResponse<permission_request::Model>>> {
    if !current_user.can_manage_hr() {
        return Err(AppError::Forbidden);
    }

    let decision = match RequestStatus::parse(&req.status) {
        Some(RequestStatus::Approved) => RequestStatus::Approved,
        Some(RequestStatus::Denied) => RequestStatus::Denied,
        _ => {
            return Err(AppError::Validation(
                "status must be approved or denied".to_string(),
            ))
        }
    };

    let existing = permission_request::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("permission request not found")?;

    if !existing.is_pending() {
        return Err(AppError::Conflict("request has already been decided".to_string()));
    }

    let requester = user::Entity::find_by_id(existing.requester_id).one(&*db).await?;
    let request_type = existing.request_type.clone();

    let mut update: permission_request::ActiveModel = existing.into();
    update.status = Set(decision.as_str().to_string());
    update.decided_by = Set(Some(current_user.id));
    update.decided_at = Set(Some(chrono::Utc::now().timestamp()));
    update.decision_note = Set(req.note.clone());
    let updated = update.update(&*db).await?;

    // Notify the requester; a failed send never fails the decision
    if let Some(requester) = requester {
        let subject = format!("Your {} request was {}", request_type, decision.as_str());
        let mut body = format!(
            "Hello {},\n\nYour {} request starting {} has been {}.\n",
            requester.full_name, request_type, updated.start_date, decision.as_str()
        );
        if let Some(note) = &req.note {
            body.push_str(&format!("\nNote from HR: {}\n", note));
        }
        if let Err(e) = state.mailer.send(&requester.email, &subject, &body).await {
            tracing::warn!("Failed to notify requester {}: {}", requester.email, e);
        }
    }

    let detail = format!("request id: {}, decision: {}", id, decision.as_str());
    log_activity(&current_user.email, ACT_DECIDE_REQUEST, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/permission-requests/:id
pub async fn delete_request(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let existing = permission_request::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("permission request not found")?;

    // Requesters may withdraw their own pending requests; HR may delete any
    let is_own_pending = existing.requester_id == current_user.id && existing.is_pending();
    if !is_own_pending && !current_user.can_manage_hr() {
        return Err(AppError::Forbidden);
    }

    permission_request::Entity::delete_by_id(id).exec(&*db).await?;

    let detail = format!("request id: {}", id);
    log_activity(&current_user.email, ACT_DELETE_REQUEST, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("request deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-08-07").is_ok());
        assert!(parse_date("2026-2-3").is_err());
        assert!(parse_date("07/08/2026").is_err());
        assert!(parse_date("not a date").is_err());
    }

    #[test]
    fn test_date_ordering() {
        let start = parse_date("2026-08-10").unwrap();
        let end = parse_date("2026-08-07").unwrap();
        assert!(end < start);
    }
}
