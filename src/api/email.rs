//! Outbound email delivery.
//!
//! Verification and password reset codes are delivered through the Resend
//! HTTP API. When no API key is configured the codes are logged instead,
//! which keeps local development working without an account.

use crate::APP_USER_AGENT;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// A single outbound email.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    /// Email carrying a verification code for a new or recovering account.
    #[must_use]
    pub fn verification(to: &str, username: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Verification Code For ANOMSG".to_string(),
            html: format!(
                "<div style=\"font-family: sans-serif;\">\
                 <h2>Hello {username},</h2>\
                 <p>Thank you for registering. Please use the following \
                 verification code to complete your registration:</p>\
                 <p style=\"font-size: 24px; letter-spacing: 4px;\"><strong>{code}</strong></p>\
                 <p>The code expires in one hour. If you did not request this \
                 code, please ignore this email.</p>\
                 </div>"
            ),
        }
    }

    /// Email carrying a password reset code.
    #[must_use]
    pub fn password_reset(to: &str, username: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Letter From ANOMSG".to_string(),
            html: format!(
                "<div style=\"font-family: sans-serif;\">\
                 <h2>Hello {username},</h2>\
                 <p>We received a request to reset your password. Use the \
                 following code to choose a new one:</p>\
                 <p style=\"font-size: 24px; letter-spacing: 4px;\"><strong>{code}</strong></p>\
                 <p>The code expires in one hour. If you did not request a \
                 reset, you can safely ignore this email.</p>\
                 </div>"
            ),
        }
    }
}

/// Delivery backend for outbound email.
///
/// Handlers report a delivery failure to the caller, so `send` runs inline
/// with the request rather than through a queue.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// Sends email through the Resend HTTP API.
pub struct ResendEmailSender {
    client: reqwest::Client,
    api_key: SecretString,
    from_address: String,
}

#[derive(Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendEmailSender {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, from_address: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Failed to build HTTP client for Resend")?;

        Ok(Self {
            client,
            api_key,
            from_address,
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    #[instrument(skip(self, message), fields(email.to = %message.to, email.subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let payload = ResendPayload {
            from: &self.from_address,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .context("Failed to reach Resend")?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(anyhow!("Resend rejected email, status {status}: {body}"));
        }

        info!("email dispatched via Resend");

        Ok(())
    }
}

/// Logs email instead of sending it. Used when no Resend API key is set.
pub struct LogEmailSender {
    from_address: String,
}

impl LogEmailSender {
    #[must_use]
    pub const fn new(from_address: String) -> Self {
        Self { from_address }
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(
            email.from = %self.from_address,
            email.to = %message.to,
            email.subject = %message.subject,
            email.html = %message.html,
            "email delivery skipped, logging instead"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_contains_code() {
        let message = EmailMessage::verification("a@b.dev", "alice", "123456");
        assert_eq!(message.to, "a@b.dev");
        assert_eq!(message.subject, "Verification Code For ANOMSG");
        assert!(message.html.contains("123456"));
        assert!(message.html.contains("alice"));
    }

    #[test]
    fn reset_email_subject() {
        let message = EmailMessage::password_reset("a@b.dev", "alice", "654321");
        assert_eq!(message.subject, "Letter From ANOMSG");
        assert!(message.html.contains("654321"));
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() -> Result<()> {
        let sender = LogEmailSender::new("onboarding@resend.dev".to_string());
        sender
            .send(EmailMessage::verification("a@b.dev", "alice", "123456"))
            .await
    }
}
