use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;

/// API response wrapper: {"success": true, "data": ...} on success,
/// {"success": false, "error": "..."} on failure
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_msg(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route(
            "/auth",
            post(handlers::auth::login)
                .delete(handlers::auth::logout)
                .get(handlers::auth::current_user),
        )
        // User routes
        .route("/users", get(handlers::user::list_users).post(handlers::user::create_user))
        .route("/users/password", post(handlers::user::change_password))
        .route("/users/avatar", post(handlers::user::upload_avatar))
        .route(
            "/users/:id",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route("/users/:id/status", put(handlers::user::set_user_status))
        .route("/users/:id/avatar", get(handlers::user::get_avatar))
        // Paralegal roster
        .route(
            "/paralegals",
            get(handlers::paralegal::list_paralegals).post(handlers::paralegal::create_paralegal),
        )
        .route(
            "/paralegals/:id",
            put(handlers::paralegal::update_paralegal)
                .delete(handlers::paralegal::delete_paralegal),
        )
        // Client cases
        .route("/cases", get(handlers::case::list_cases).post(handlers::case::create_case))
        .route(
            "/cases/:id",
            get(handlers::case::get_case)
                .put(handlers::case::update_case)
                .delete(handlers::case::delete_case),
        )
        .route("/cases/:id/notes", post(handlers::case::add_note))
        .route("/cases/:id/notes/:note_id", delete(handlers::case::delete_note))
        // HR: permission requests
        .route(
            "/permission-requests",
            get(handlers::permission_request::list_requests)
                .post(handlers::permission_request::create_request),
        )
        .route(
            "/permission-requests/:id",
            put(handlers::permission_request::decide_request)
                .delete(handlers::permission_request::delete_request),
        )
        // HR: incident reports
        .route(
            "/incident-reports",
            get(handlers::incident_report::list_reports)
                .post(handlers::incident_report::create_report),
        )
        .route(
            "/incident-reports/:id",
            put(handlers::incident_report::review_report)
                .delete(handlers::incident_report::delete_report),
        )
        // Training modules and their content sections
        .route(
            "/training-modules",
            get(handlers::training::list_modules).post(handlers::training::create_module),
        )
        .route(
            "/training-modules/:id",
            get(handlers::training::get_module)
                .put(handlers::training::update_module)
                .delete(handlers::training::delete_module),
        )
        .route("/training-modules/:id/content", post(handlers::training::add_content))
        .route(
            "/training-modules/:id/content/:content_id",
            put(handlers::training::update_content).delete(handlers::training::delete_content),
        )
        // News
        .route("/news", get(handlers::news::list_news).post(handlers::news::create_news))
        .route(
            "/news/:id",
            get(handlers::news::get_news)
                .put(handlers::news::update_news)
                .delete(handlers::news::delete_news),
        )
        // Files (base64 blobs in the database)
        .route(
            "/files",
            get(handlers::file::list_files).post(
                handlers::file::upload_file,
            ),
        )
        .route(
            "/files/:id",
            get(handlers::file::download_file).delete(handlers::file::delete_file),
        )
        // Activity log
        .route(
            "/activity",
            get(handlers::activity::query_activity).delete(handlers::activity::delete_activity),
        )
        .layer(DefaultBodyLimit::max(state.config.max_upload_size));

    // Static file service for the SPA dashboard
    // Serves files from webapp/dist, falls back to index.html for client routing
    let static_dir = "webapp/dist";
    let index_file = format!("{}/index.html", static_dir);
    let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(serve_dir)
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let resp = ApiResponse::success(vec![1, 2, 3]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_shape() {
        let resp = ApiResponse::<()>::error("nope");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("data").is_none());
    }
}
