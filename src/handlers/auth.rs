//! Authentication handlers
//!
//! Implements login, logout, and current user endpoints. A successful login
//! sets the JWT session cookie; logout expires it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::json;

use crate::entity::user::{self, UserStatus};
use crate::handlers::activity::service::{log_activity, RESULT_FAILED, RESULT_OK};
use crate::handlers::user::UserResponse;
use crate::middleware::auth::CurrentUser;
use crate::middleware::DbConn;
use crate::routes::ApiResponse;
use crate::state::AppState;

const ACT_LOGIN: &str = "login";
const ACT_LOGOUT: &str = "logout";

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({"success": false, "error": error}))).into_response()
}

/// POST /api/auth
pub async fn login(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Response {
    if req.email.is_empty() || req.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "email and password are required");
    }

    let db = &*db;
    let user_result = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(db)
        .await;

    let db_user = match user_result {
        Ok(Some(u)) => u,
        Ok(None) => {
            // Same response as a wrong password
            tracing::warn!("Login failed: unknown email - {}", req.email);
            log_activity(&req.email, ACT_LOGIN, "unknown email", RESULT_FAILED, None);
            return error_response(StatusCode::UNAUTHORIZED, "invalid email or password");
        }
        Err(e) => {
            tracing::error!("Database error during login: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    let password_valid = bcrypt::verify(&req.password, &db_user.password).unwrap_or(false);
    if !password_valid {
        tracing::warn!("Login failed: wrong password - {}", req.email);
        log_activity(&req.email, ACT_LOGIN, "wrong password", RESULT_FAILED, None);
        return error_response(StatusCode::UNAUTHORIZED, "invalid email or password");
    }

    if db_user.status() == UserStatus::Disabled {
        tracing::warn!("Login failed: account disabled - {}", req.email);
        log_activity(&req.email, ACT_LOGIN, "account disabled", RESULT_FAILED, None);
        return error_response(StatusCode::FORBIDDEN, "account disabled");
    }

    let token = match state.jwt.generate(db_user.id, &db_user.email, &db_user.role) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to sign session token: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        }
    };

    // First successful login activates an inactive account
    let now = chrono::Utc::now().timestamp();
    let mut active_model: user::ActiveModel = db_user.clone().into();
    active_model.last_login = Set(now);
    active_model.status = Set(UserStatus::Active.into());
    let db_user = match active_model.update(db).await {
        Ok(updated) => updated,
        Err(e) => {
            tracing::error!("Failed to update last login: {}", e);
            db_user
        }
    };

    let cookie = Cookie::build((state.config.jwt.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!("User logged in: {}", req.email);
    log_activity(&req.email, ACT_LOGIN, "", RESULT_OK, None);

    (
        jar.add(cookie),
        Json(ApiResponse::success(UserResponse::from(db_user))),
    )
        .into_response()
}

/// DELETE /api/auth
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    // The cookie may already be gone; expiring it again is harmless
    let mut removal = Cookie::from(state.config.jwt.cookie_name.clone());
    removal.set_path("/");
    let jar = jar.remove(removal);

    (jar, Json(ApiResponse::success_msg("logged out"))).into_response()
}

/// GET /api/auth
pub async fn current_user(
    Extension(db): Extension<DbConn>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    match user::Entity::find_by_id(current.id).one(&*db).await {
        Ok(Some(u)) => Json(ApiResponse::success(UserResponse::from(u))).into_response(),
        Ok(None) => error_response(StatusCode::UNAUTHORIZED, "invalid session"),
        Err(e) => {
            tracing::error!("Database error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let response = error_response(StatusCode::UNAUTHORIZED, "invalid email or password");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
