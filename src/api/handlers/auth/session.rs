//! Stateless session tokens.
//!
//! Sessions are HS256-signed JWTs carried in an `HttpOnly` cookie. There is
//! no server-side session table, revocation happens through expiry.

use super::{state::AuthState, types::StatusResponse};
use anyhow::{Context, Result};
use axum::{
    Json,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use chrono::Utc;
use jsonwebtoken::{Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "anomsg_session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: Uuid,
    pub username: String,
    pub is_verified: bool,
    /// Issued-at, also drives the idle-refresh below.
    pub iat: i64,
    pub exp: i64,
}

/// Sign a session token for the given user.
/// # Errors
/// Returns an error if signing fails.
pub fn issue_token(
    state: &AuthState,
    user_id: Uuid,
    username: &str,
    is_verified: bool,
) -> Result<String> {
    let now = Utc::now().timestamp();

    let claims = SessionClaims {
        sub: user_id,
        username: username.to_string(),
        is_verified,
        iat: now,
        exp: now + state.config().session_ttl_seconds(),
    };

    encode(&Header::default(), &claims, state.encoding_key()).context("Failed to sign session token")
}

/// Decode and validate a session token.
/// # Errors
/// Returns an error if the token is malformed, tampered with, or expired.
pub fn verify_token(state: &AuthState, token: &str) -> Result<SessionClaims> {
    decode::<SessionClaims>(token, state.decoding_key(), &Validation::default())
        .map(|data| data.claims)
        .context("Invalid session token")
}

/// Build the `Set-Cookie` value carrying the session token.
/// # Errors
/// Returns an error if the cookie value is not a valid header.
pub fn session_cookie(state: &AuthState, token: &str) -> Result<HeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.config().session_ttl_seconds()
    );

    if state.config().session_cookie_secure() {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).context("Failed to build session cookie header")
}

/// Pull the session token out of the request, cookie first, then a bearer
/// token for non-browser clients.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(cookie_value)
    {
        return Some(token);
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn cookie_value(raw: &str) -> Option<String> {
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Require a valid session or answer 401.
/// # Errors
/// Returns a ready-to-send 401 response when the session is missing or invalid.
pub fn require_session(state: &AuthState, headers: &HeaderMap) -> Result<SessionClaims, Response> {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(StatusResponse::err("Not authenticated")),
        )
            .into_response()
    };

    let token = token_from_headers(headers).ok_or_else(unauthorized)?;

    verify_token(state, &token).map_err(|_| unauthorized())
}

/// Reissue the session cookie when the token has aged past the refresh
/// window, keeping active users signed in without a fixed 30-day cliff.
pub fn refresh_session(state: &AuthState, claims: &SessionClaims, response: &mut Response) {
    let age = Utc::now().timestamp() - claims.iat;

    if age < state.config().session_refresh_seconds() {
        return;
    }

    match issue_token(state, claims.sub, &claims.username, claims.is_verified)
        .and_then(|token| session_cookie(state, &token))
    {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(err) => warn!("failed to refresh session cookie: {err}"),
    }
}
