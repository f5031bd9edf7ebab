use crate::api::{
    self,
    email::{EmailSender, LogEmailSender, ResendEmailSender},
    handlers::auth::AuthConfig,
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub base_url: String,
    pub code_ttl_seconds: i64,
    pub session_ttl_seconds: i64,
    pub session_refresh_seconds: i64,
    pub session_secret: SecretString,
    pub resend_api_key: Option<SecretString>,
    pub email_from: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the email sender cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.base_url, args.session_secret)
        .with_code_ttl_seconds(args.code_ttl_seconds)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_refresh_seconds(args.session_refresh_seconds);

    let sender: Arc<dyn EmailSender> = match args.resend_api_key {
        Some(api_key) => Arc::new(ResendEmailSender::new(api_key, args.email_from)?),
        None => {
            info!("no Resend API key configured; outbound email will be logged");
            Arc::new(LogEmailSender::new(args.email_from))
        }
    };

    api::new(args.port, args.dsn, auth_config, sender).await
}
