//! Client case handlers
//!
//! Case tracking and per-case notes.

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entity::client_case::{self, CaseStatus};
use crate::entity::{case_note, user};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::activity::service::{log_activity, RESULT_OK};
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;

const ACT_CREATE_CASE: &str = "open case";
const ACT_UPDATE_CASE: &str = "update case";
const ACT_DELETE_CASE: &str = "delete case";
const ACT_ADD_NOTE: &str = "add case note";
const ACT_DELETE_NOTE: &str = "delete case note";

/// List filters
#[derive(Debug, Deserialize)]
pub struct CaseListQuery {
    pub status: Option<String>,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<i64>,
}

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreateCaseRequest {
    #[serde(rename = "caseNumber")]
    pub case_number: String,
    pub title: String,
    #[serde(rename = "clientName")]
    pub client_name: String,
    #[serde(rename = "practiceArea")]
    pub practice_area: String,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<i64>,
    #[serde(default)]
    pub description: String,
}

/// Update request
///
/// `assignedTo` distinguishes "absent" (leave unchanged) from `null`
/// (unassign) via the nested Option.
#[derive(Debug, Deserialize)]
pub struct UpdateCaseRequest {
    pub title: Option<String>,
    #[serde(rename = "clientName")]
    pub client_name: Option<String>,
    #[serde(rename = "practiceArea")]
    pub practice_area: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "assignedTo", default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<i64>>,
    pub description: Option<String>,
}

/// Wraps a present value (including null) in Some, so an absent field
/// deserializes to None via `default`
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Note creation request
#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    pub body: String,
}

/// Case summary response
#[derive(Debug, Serialize)]
pub struct CaseResponse {
    pub id: i64,
    #[serde(rename = "caseNumber")]
    pub case_number: String,
    pub title: String,
    #[serde(rename = "clientName")]
    pub client_name: String,
    #[serde(rename = "practiceArea")]
    pub practice_area: String,
    pub status: String,
    #[serde(rename = "openedBy")]
    pub opened_by: i64,
    #[serde(rename = "assignedTo")]
    pub assigned_to: Option<i64>,
    pub description: String,
    #[serde(rename = "openedAt")]
    pub opened_at: i64,
    #[serde(rename = "closedAt")]
    pub closed_at: Option<i64>,
}

impl From<client_case::Model> for CaseResponse {
    fn from(m: client_case::Model) -> Self {
        Self {
            id: m.id,
            case_number: m.case_number,
            title: m.title,
            client_name: m.client_name,
            practice_area: m.practice_area,
            status: m.status,
            opened_by: m.opened_by,
            assigned_to: m.assigned_to,
            description: m.description,
            opened_at: m.opened_at,
            closed_at: m.closed_at,
        }
    }
}

/// Note with author name
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: i64,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    #[serde(rename = "authorName")]
    pub author_name: String,
    pub body: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Case with its notes
#[derive(Debug, Serialize)]
pub struct CaseDetailResponse {
    #[serde(flatten)]
    pub case: CaseResponse,
    pub notes: Vec<NoteResponse>,
}

/// May the caller write to this case?
fn can_write_case(user: &CurrentUser, case: &client_case::Model) -> bool {
    user.can_manage_cases() || case.assigned_to == Some(user.id) || case.opened_by == user.id
}

/// GET /api/cases
pub async fn list_cases(
    Extension(db): Extension<DbConn>,
    Query(query): Query<CaseListQuery>,
) -> AppResult<Json<ApiResponse<Vec<CaseResponse>>>> {
    let mut find = client_case::Entity::find().order_by_desc(client_case::Column::OpenedAt);

    if let Some(status) = &query.status {
        if CaseStatus::parse(status).is_none() {
            return Err(AppError::Validation(format!("unknown status: {}", status)));
        }
        find = find.filter(client_case::Column::Status.eq(status));
    }
    if let Some(assigned_to) = query.assigned_to {
        find = find.filter(client_case::Column::AssignedTo.eq(assigned_to));
    }

    let cases = find
        .all(&*db)
        .await?
        .into_iter()
        .map(CaseResponse::from)
        .collect();

    Ok(Json(ApiResponse::success(cases)))
}

/// GET /api/cases/:id
pub async fn get_case(
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<CaseDetailResponse>>> {
    let case = client_case::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("case not found")?;

    let note_rows = case_note::Entity::find()
        .filter(case_note::Column::CaseId.eq(id))
        .order_by_asc(case_note::Column::Id)
        .all(&*db)
        .await?;

    let mut notes = Vec::with_capacity(note_rows.len());
    for n in note_rows {
        let author_name = match user::Entity::find_by_id(n.author_id).one(&*db).await {
            Ok(Some(u)) => u.full_name,
            _ => String::new(),
        };
        notes.push(NoteResponse {
            id: n.id,
            author_id: n.author_id,
            author_name,
            body: n.body,
            created_at: n.created_at,
        });
    }

    Ok(Json(ApiResponse::success(CaseDetailResponse {
        case: CaseResponse::from(case),
        notes,
    })))
}

/// POST /api/cases
pub async fn create_case(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateCaseRequest>,
) -> AppResult<Json<ApiResponse<CaseResponse>>> {
    if !current_user.can_manage_cases() {
        return Err(AppError::Forbidden);
    }

    if req.case_number.trim().is_empty() {
        return Err(AppError::Validation("case number is required".to_string()));
    }
    if req.title.trim().is_empty() || req.client_name.trim().is_empty() {
        return Err(AppError::Validation("title and client name are required".to_string()));
    }

    let existing = client_case::Entity::find()
        .filter(client_case::Column::CaseNumber.eq(req.case_number.trim()))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("case number already exists".to_string()));
    }

    if let Some(assignee) = req.assigned_to {
        user::Entity::find_by_id(assignee)
            .one(&*db)
            .await?
            .ok_or_not_found("assigned user not found")?;
    }

    let new_case = client_case::ActiveModel {
        case_number: Set(req.case_number.trim().to_string()),
        title: Set(req.title.trim().to_string()),
        client_name: Set(req.client_name.trim().to_string()),
        practice_area: Set(req.practice_area.trim().to_string()),
        status: Set(CaseStatus::Open.as_str().to_string()),
        opened_by: Set(current_user.id),
        assigned_to: Set(req.assigned_to),
        description: Set(req.description),
        opened_at: Set(chrono::Utc::now().timestamp()),
        closed_at: Set(None),
        ..Default::default()
    };
    let created = new_case.insert(&*db).await?;

    let detail = format!("case: {}", created.case_number);
    log_activity(&current_user.email, ACT_CREATE_CASE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(CaseResponse::from(created))))
}

/// PUT /api/cases/:id
pub async fn update_case(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCaseRequest>,
) -> AppResult<Json<ApiResponse<CaseResponse>>> {
    if !current_user.can_manage_cases() {
        return Err(AppError::Forbidden);
    }

    let existing = client_case::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("case not found")?;

    let new_status = match req.status.as_deref() {
        Some(s) => Some(
            CaseStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status: {}", s)))?,
        ),
        None => None,
    };

    if let Some(Some(assignee)) = req.assigned_to {
        user::Entity::find_by_id(assignee)
            .one(&*db)
            .await?
            .ok_or_not_found("assigned user not found")?;
    }

    let was_closed = existing.status() == Some(CaseStatus::Closed);
    let case_number = existing.case_number.clone();

    let mut update: client_case::ActiveModel = existing.into();
    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        update.title = Set(title.trim().to_string());
    }
    if let Some(client_name) = req.client_name {
        update.client_name = Set(client_name.trim().to_string());
    }
    if let Some(practice_area) = req.practice_area {
        update.practice_area = Set(practice_area.trim().to_string());
    }
    if let Some(description) = req.description {
        update.description = Set(description);
    }
    if let Some(assigned_to) = req.assigned_to {
        update.assigned_to = Set(assigned_to);
    }
    if let Some(status) = new_status {
        update.status = Set(status.as_str().to_string());
        // Closing stamps the timestamp, reopening clears it
        if status == CaseStatus::Closed && !was_closed {
            update.closed_at = Set(Some(chrono::Utc::now().timestamp()));
        } else if status != CaseStatus::Closed && was_closed {
            update.closed_at = Set(None);
        }
    }

    let updated = update.update(&*db).await?;

    let detail = format!("case: {}", case_number);
    log_activity(&current_user.email, ACT_UPDATE_CASE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(CaseResponse::from(updated))))
}

/// DELETE /api/cases/:id
pub async fn delete_case(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    let existing = client_case::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("case not found")?;

    case_note::Entity::delete_many()
        .filter(case_note::Column::CaseId.eq(id))
        .exec(&*db)
        .await?;
    client_case::Entity::delete_by_id(id).exec(&*db).await?;

    let detail = format!("case: {}", existing.case_number);
    log_activity(&current_user.email, ACT_DELETE_CASE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("case deleted")))
}

/// POST /api/cases/:id/notes
pub async fn add_note(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<AddNoteRequest>,
) -> AppResult<Json<ApiResponse<case_note::Model>>> {
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("note body is required".to_string()));
    }

    let case = client_case::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found("case not found")?;

    if !can_write_case(&current_user, &case) {
        return Err(AppError::Forbidden);
    }

    let new_note = case_note::ActiveModel {
        case_id: Set(id),
        author_id: Set(current_user.id),
        body: Set(req.body),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };
    let created = new_note.insert(&*db).await?;

    let detail = format!("case: {}", case.case_number);
    log_activity(&current_user.email, ACT_ADD_NOTE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success(created)))
}

/// DELETE /api/cases/:id/notes/:note_id
pub async fn delete_note(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, note_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let note = case_note::Entity::find_by_id(note_id)
        .one(&*db)
        .await?
        .ok_or_not_found("note not found")?;

    if note.case_id != id {
        return Err(AppError::NotFound("note not found".to_string()));
    }
    if note.author_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    case_note::Entity::delete_by_id(note_id).exec(&*db).await?;

    let detail = format!("note id: {}", note_id);
    log_activity(&current_user.email, ACT_DELETE_NOTE, &detail, RESULT_OK, None);

    Ok(Json(ApiResponse::success_msg("note deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::user::UserStatus;

    fn make_case(assigned_to: Option<i64>, opened_by: i64) -> client_case::Model {
        client_case::Model {
            id: 1,
            case_number: "2026-0001".to_string(),
            title: "Estate of Example".to_string(),
            client_name: "Example Client".to_string(),
            practice_area: "estate".to_string(),
            status: "open".to_string(),
            opened_by,
            assigned_to,
            description: String::new(),
            opened_at: 0,
            closed_at: None,
        }
    }

    fn make_user(id: i64, role: crate::entity::user::Role) -> CurrentUser {
        CurrentUser {
            id,
            email: "someone@firm.example".to_string(),
            full_name: "Someone".to_string(),
            role,
            status: UserStatus::Active,
        }
    }

    #[test]
    fn test_update_request_assignee_field() {
        // Absent: leave unchanged
        let req: UpdateCaseRequest = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert_eq!(req.assigned_to, None);

        // Null: unassign
        let req: UpdateCaseRequest = serde_json::from_str(r#"{"assignedTo": null}"#).unwrap();
        assert_eq!(req.assigned_to, Some(None));

        // Value: reassign
        let req: UpdateCaseRequest = serde_json::from_str(r#"{"assignedTo": 7}"#).unwrap();
        assert_eq!(req.assigned_to, Some(Some(7)));
    }

    #[test]
    fn test_can_write_case() {
        use crate::entity::user::Role;

        let case = make_case(Some(5), 3);
        assert!(can_write_case(&make_user(1, Role::Admin), &case));
        assert!(can_write_case(&make_user(2, Role::Attorney), &case));
        assert!(can_write_case(&make_user(5, Role::Paralegal), &case));
        assert!(can_write_case(&make_user(3, Role::Paralegal), &case));
        assert!(!can_write_case(&make_user(9, Role::Paralegal), &case));
        assert!(!can_write_case(&make_user(9, Role::Hr), &case));
    }
}
