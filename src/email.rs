//! Outbound email
//!
//! Thin SMTP client used by the user-provisioning and HR workflow handlers.
//! Sends are best-effort: failures are logged by the caller and never fail
//! the enclosing request.

use lettre::message::header;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;
use tracing::debug;

use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};

/// SMTP mailer
#[derive(Clone)]
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// HR notification inbox, if configured
    pub fn hr_inbox(&self) -> Option<&str> {
        if self.config.hr_inbox.is_empty() {
            None
        } else {
            Some(&self.config.hr_inbox)
        }
    }

    fn build_transport(&self) -> AppResult<SmtpTransport> {
        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let transport = SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|e| AppError::Internal(format!("failed to create SMTP transport: {}", e)))?
            .port(self.config.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(30)))
            .build();

        Ok(transport)
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let from = self
            .config
            .from
            .parse()
            .map_err(|e| AppError::Internal(format!("invalid from address: {}", e)))?;

        let to = to
            .parse()
            .map_err(|e| AppError::Validation(format!("invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("failed to build message: {}", e)))
    }

    /// Send a plain-text email
    ///
    /// The synchronous transport runs on the blocking pool.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if !self.config.enabled {
            debug!(to = %to, subject = %subject, "SMTP disabled, skipping email");
            return Ok(());
        }

        let message = self.build_message(to, subject, body)?;
        let transport = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| AppError::Internal(format!("failed to send email: {}", e)))
        })
        .await
        .map_err(|e| AppError::Internal(format!("task join error: {}", e)))??;

        debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SmtpConfig {
        SmtpConfig {
            enabled: true,
            host: "smtp.firm.example".to_string(),
            port: 587,
            username: "noreply@firm.example".to_string(),
            password: "password".to_string(),
            from: "Lexnet <noreply@firm.example>".to_string(),
            hr_inbox: "hr@firm.example".to_string(),
        }
    }

    #[test]
    fn test_build_message() {
        let mailer = Mailer::new(test_config());
        let result = mailer.build_message("jane@firm.example", "Welcome", "Hello");
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let mailer = Mailer::new(test_config());
        let result = mailer.build_message("not-an-address", "Welcome", "Hello");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_hr_inbox() {
        let mailer = Mailer::new(test_config());
        assert_eq!(mailer.hr_inbox(), Some("hr@firm.example"));

        let mailer = Mailer::new(SmtpConfig::default());
        assert_eq!(mailer.hr_inbox(), None);
    }

    #[tokio::test]
    async fn test_disabled_mailer_is_noop() {
        let mut config = test_config();
        config.enabled = false;
        let mailer = Mailer::new(config);

        let result = mailer.send("jane@firm.example", "Welcome", "Hello").await;
        assert!(result.is_ok());
    }
}
