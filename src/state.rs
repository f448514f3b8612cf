use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::email::Mailer;
use crate::jwt::JwtService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Application configuration
    pub config: Arc<Config>,
    /// Session token service
    pub jwt: JwtService,
    /// Outbound SMTP mailer
    pub mailer: Mailer,
}

impl AppState {
    /// Create new application state
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let jwt = JwtService::from_config(&config.jwt);
        let mailer = Mailer::new(config.smtp.clone());

        Self {
            db,
            config: Arc::new(config),
            jwt,
            mailer,
        }
    }
}
