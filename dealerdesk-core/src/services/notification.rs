//! Delivers passcodes and operation outcome notices over a [`Mailer`].

use std::sync::Arc;

use dealerdesk_mailer::{Email, Mailer, MailerError};

use crate::{
    Error,
    error::NotificationError,
    notification::{Outcome, otp_body, outcome_body},
};

/// Who receives outcome notices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfig {
    pub from_address: String,
    /// Receive success notices and team copies of purchases.
    pub receivers: Vec<String>,
    /// Receive failure and warning notices.
    pub error_recipients: Vec<String>,
}

impl NotificationConfig {
    /// Splits a comma separated address list, dropping blanks.
    pub fn parse_recipients(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    config: NotificationConfig,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, config: NotificationConfig) -> Self {
        Self { mailer, config }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Sends one plain-text email, surfacing any failure.
    pub async fn send(&self, to: &[String], subject: &str, body: String) -> Result<(), Error> {
        let email = Email::builder()
            .from(self.config.from_address.clone())
            .to_multiple(to.iter().cloned())
            .subject(subject)
            .text_body(body)
            .build()
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.mailer.send_email(email).await.map_err(|e| match e {
            MailerError::Builder(msg) => NotificationError::Build(msg),
            MailerError::Address(e) => NotificationError::Build(e.to_string()),
            other => NotificationError::Send(other.to_string()),
        })?;

        tracing::debug!(subject = %subject, recipients = to.len(), "Sent notification");
        Ok(())
    }

    /// Emails a freshly issued passcode to its owner.
    pub async fn send_otp(&self, email: &str, code: u32, ttl_secs: i64) -> Result<(), Error> {
        self.send(
            &[email.to_string()],
            "Your OTP Code",
            otp_body(code, ttl_secs),
        )
        .await
    }

    pub async fn notify_success(&self, subject: &str, details: &str) {
        self.deliver(
            &self.config.receivers,
            subject,
            outcome_body(Outcome::Success, details),
        )
        .await;
    }

    pub async fn notify_failure(&self, subject: &str, details: &str) {
        self.deliver(
            &self.config.error_recipients,
            subject,
            outcome_body(Outcome::Failure, details),
        )
        .await;
    }

    pub async fn notify_warning(&self, subject: &str, details: &str) {
        self.deliver(
            &self.config.error_recipients,
            subject,
            outcome_body(Outcome::Warning, details),
        )
        .await;
    }

    /// Sends a pre-formatted body to the receivers list.
    pub async fn notify_team(&self, subject: &str, body: String) {
        self.deliver(&self.config.receivers, subject, body).await;
    }

    /// Sends a pre-formatted body to a single customer address.
    pub async fn notify_customer(&self, email: &str, subject: &str, body: String) {
        self.deliver(&[email.to_string()], subject, body).await;
    }

    /// Best-effort send: failures are logged, never returned.
    async fn deliver(&self, to: &[String], subject: &str, body: String) {
        if to.is_empty() {
            tracing::debug!(subject = %subject, "No recipients configured, skipping notification");
            return;
        }
        if let Err(e) = self.send(to, subject, body).await {
            tracing::warn!(error = %e, subject = %subject, "Failed to send notification");
        }
    }
}
