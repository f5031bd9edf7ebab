use anyhow::{Result, bail};
use jsonwebtoken::{DecodingKey, EncodingKey};
use secrecy::{ExposeSecret, SecretString};

const DEFAULT_CODE_TTL_SECONDS: i64 = 3600;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 2_592_000;
const DEFAULT_SESSION_REFRESH_SECONDS: i64 = 3600;

/// Tunables for verification codes and session tokens.
#[derive(Debug)]
pub struct AuthConfig {
    base_url: String,
    session_secret: SecretString,
    code_ttl_seconds: i64,
    session_ttl_seconds: i64,
    session_refresh_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub const fn new(base_url: String, session_secret: SecretString) -> Self {
        Self {
            base_url,
            session_secret,
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_refresh_seconds: DEFAULT_SESSION_REFRESH_SECONDS,
        }
    }

    #[must_use]
    pub const fn with_code_ttl_seconds(mut self, seconds: i64) -> Self {
        self.code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_session_refresh_seconds(mut self, seconds: i64) -> Self {
        self.session_refresh_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn code_ttl_seconds(&self) -> i64 {
        self.code_ttl_seconds
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub const fn session_refresh_seconds(&self) -> i64 {
        self.session_refresh_seconds
    }

    /// Mark the session cookie `Secure` when the site is served over TLS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Shared auth state, carries the configuration and the session signing keys.
pub struct AuthState {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the session secret is too short to sign tokens with.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let secret = config.session_secret.expose_secret();

        if secret.len() < 32 {
            bail!("Session secret must be at least 32 bytes");
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub(crate) const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    #[must_use]
    pub(crate) const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn config_defaults() {
        let config = AuthConfig::new("https://anomsg.dev".to_string(), secret());
        assert_eq!(config.code_ttl_seconds(), 3600);
        assert_eq!(config.session_ttl_seconds(), 2_592_000);
        assert_eq!(config.session_refresh_seconds(), 3600);
        assert!(config.session_cookie_secure());
    }

    #[test]
    fn config_builders_override() {
        let config = AuthConfig::new("http://localhost:3000".to_string(), secret())
            .with_code_ttl_seconds(60)
            .with_session_ttl_seconds(120)
            .with_session_refresh_seconds(30);
        assert_eq!(config.code_ttl_seconds(), 60);
        assert_eq!(config.session_ttl_seconds(), 120);
        assert_eq!(config.session_refresh_seconds(), 30);
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn state_rejects_short_secret() {
        let config = AuthConfig::new(
            "https://anomsg.dev".to_string(),
            SecretString::from("too-short"),
        );
        assert!(AuthState::new(config).is_err());
    }

    #[test]
    fn state_accepts_long_secret() {
        let config = AuthConfig::new("https://anomsg.dev".to_string(), secret());
        assert!(AuthState::new(config).is_ok());
    }
}
