//! Authentication middleware
//!
//! Validates the JWT session cookie on every API request and loads the
//! current user into request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;
use std::ops::Deref;

use crate::entity::user::{self, Role, UserStatus};
use crate::state::AppState;

/// Database connection wrapper for use in handlers via Extension
#[derive(Clone)]
pub struct DbConn(pub DatabaseConnection);

impl Deref for DbConn {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extension to store current user in request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: UserStatus,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// User administration is admin-only
    pub fn can_manage_users(&self) -> bool {
        self.is_admin()
    }

    /// HR workflows (permission requests, incident reports, paralegal roster)
    pub fn can_manage_hr(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Hr)
    }

    /// Opening and editing client cases
    pub fn can_manage_cases(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Attorney)
    }

    /// Authoring training modules and news
    pub fn can_publish(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Hr)
    }

    /// Activity log access is admin-only
    pub fn can_view_activity(&self) -> bool {
        self.is_admin()
    }
}

/// Requests that don't require authentication
fn is_public(method: &Method, path: &str) -> bool {
    // Only authenticate API routes; everything else is static SPA assets
    if !path.starts_with("/api") {
        return true;
    }

    // Login and logout
    if path == "/api/auth" && (*method == Method::POST || *method == Method::DELETE) {
        return true;
    }
    // Health check
    if path == "/api/health" {
        return true;
    }
    false
}

fn unauthorized(error: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "error": error})),
    )
        .into_response()
}

/// Authentication middleware
pub async fn auth_layer(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    // All handlers access the database via Extension<DbConn>
    request.extensions_mut().insert(DbConn(state.db.clone()));

    if is_public(&method, &path) {
        return next.run(request).await;
    }

    // Pull the session token from the cookie
    let jar = CookieJar::from_headers(request.headers());
    let Some(cookie) = jar.get(&state.config.jwt.cookie_name) else {
        return unauthorized("unauthorized");
    };

    let claims = match state.jwt.validate(cookie.value()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Session token rejected: {}", e);
            return unauthorized("unauthorized");
        }
    };

    // Re-load the user so disabled accounts lose access immediately
    let user_result = user::Entity::find_by_id(claims.sub).one(&state.db).await;

    match user_result {
        Ok(Some(user_model)) => {
            if user_model.status() == UserStatus::Disabled {
                tracing::warn!("Disabled user rejected: {}", user_model.email);
                return unauthorized("account disabled");
            }

            let Some(role) = user_model.role() else {
                tracing::error!("User {} has unknown role '{}'", user_model.email, user_model.role);
                return unauthorized("invalid session");
            };

            let status = user_model.status();
            let current_user = CurrentUser {
                id: user_model.id,
                email: user_model.email,
                full_name: user_model.full_name,
                role,
                status,
            };

            request.extensions_mut().insert(current_user);

            next.run(request).await
        }
        Ok(None) => {
            tracing::warn!("Session token for missing user id {}", claims.sub);
            unauthorized("invalid session")
        }
        Err(e) => {
            tracing::error!("Database error during auth: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "internal error"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "someone@firm.example".to_string(),
            full_name: "Someone".to_string(),
            role,
            status: UserStatus::Active,
        }
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public(&Method::GET, "/assets/app.js"));
        assert!(is_public(&Method::GET, "/api/health"));
        assert!(is_public(&Method::POST, "/api/auth"));
        assert!(is_public(&Method::DELETE, "/api/auth"));
        assert!(!is_public(&Method::GET, "/api/auth"));
        assert!(!is_public(&Method::GET, "/api/users"));
        assert!(!is_public(&Method::POST, "/api/cases"));
    }

    #[test]
    fn test_role_gates() {
        let admin = make_user(Role::Admin);
        assert!(admin.can_manage_users());
        assert!(admin.can_manage_hr());
        assert!(admin.can_manage_cases());
        assert!(admin.can_publish());
        assert!(admin.can_view_activity());

        let hr = make_user(Role::Hr);
        assert!(!hr.can_manage_users());
        assert!(hr.can_manage_hr());
        assert!(!hr.can_manage_cases());
        assert!(hr.can_publish());
        assert!(!hr.can_view_activity());

        let attorney = make_user(Role::Attorney);
        assert!(!attorney.can_manage_users());
        assert!(!attorney.can_manage_hr());
        assert!(attorney.can_manage_cases());
        assert!(!attorney.can_publish());

        let paralegal = make_user(Role::Paralegal);
        assert!(!paralegal.can_manage_users());
        assert!(!paralegal.can_manage_hr());
        assert!(!paralegal.can_manage_cases());
        assert!(!paralegal.can_publish());
    }
}
