//! Password reset, step one mails a fresh code, step three replaces the
//! password. Step two (code confirmation) goes through `/codeverification`.

use super::{
    password, state::AuthState, storage,
    types::{ResetPasswordRequest, ResetRequest, ResetRequestResponse, StatusResponse},
    utils, validate,
};
use crate::api::{
    email::{EmailMessage, EmailSender},
    handlers::internal_error,
};
use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Mail a password reset code to an existing account.
#[utoipa::path(
    post,
    path = "/sendemails",
    tag = "account",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Reset code sent", body = ResetRequestResponse),
        (status = 400, description = "Invalid email address", body = StatusResponse),
        (status = 404, description = "No account for this email", body = StatusResponse),
        (status = 500, description = "Internal error or email delivery failure", body = StatusResponse)
    )
)]
pub async fn request_reset(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    Extension(sender): Extension<Arc<dyn EmailSender>>,
    Json(payload): Json<ResetRequest>,
) -> Response {
    let problems = validate::validate_email(&payload.email);
    if !problems.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::err(&problems.join("; "))),
        )
            .into_response();
    }

    let email_address = utils::normalize_email(&payload.email);

    let user = match storage::find_by_email(&pool, &email_address).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(StatusResponse::err("No account found for this email")),
            )
                .into_response();
        }
        Err(err) => return internal_error(&err),
    };

    let code = utils::generate_verify_code();
    let expires = Utc::now() + Duration::seconds(auth.config().code_ttl_seconds());

    if let Err(err) = storage::set_verify_code(&pool, user.id, &code, expires).await {
        return internal_error(&err);
    }

    let message = EmailMessage::password_reset(&email_address, &user.username, &code);
    if let Err(err) = sender.send(message).await {
        tracing::error!("password reset email failed: {err:?}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::err(
                "Failed to send the reset email. Try again later.",
            )),
        )
            .into_response();
    }

    info!(username = %user.username, "password reset code sent");

    (
        StatusCode::OK,
        Json(ResetRequestResponse {
            success: true,
            message: "Reset code sent to your email".to_string(),
            username: user.username,
        }),
    )
        .into_response()
}

/// Replace the password after the reset code was confirmed.
///
/// Requires an outstanding unexpired code on the account, the code is
/// consumed on success so it cannot authorize a second reset.
#[utoipa::path(
    post,
    path = "/resetpassword",
    tag = "account",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = StatusResponse),
        (status = 400, description = "Weak password or no active reset window", body = StatusResponse),
        (status = 404, description = "Unknown username", body = StatusResponse)
    )
)]
pub async fn reset_password(
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Response {
    let problems = validate::validate_password(&payload.password);
    if !problems.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::err(&problems.join("; "))),
        )
            .into_response();
    }

    let username = utils::decode_username(&payload.username);

    let user = match storage::find_by_username(&pool, &username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(StatusResponse::err("User not found")),
            )
                .into_response();
        }
        Err(err) => return internal_error(&err),
    };

    let window_open = user.verify_code.is_some()
        && user
            .verify_code_expires
            .is_some_and(|expires| Utc::now() < expires);

    if !window_open {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::err(
                "Password reset is not authorized. Request a new code first.",
            )),
        )
            .into_response();
    }

    let password_hash = match password::hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => return internal_error(&err),
    };

    if let Err(err) = storage::reset_password(&pool, user.id, &password_hash).await {
        return internal_error(&err);
    }

    info!(username = %username, "password reset completed");

    (
        StatusCode::OK,
        Json(StatusResponse::ok("Password updated successfully")),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/anomsg").expect("lazy pool")
    }

    #[tokio::test]
    async fn reset_rejects_weak_password() {
        let response = reset_password(
            Extension(lazy_pool()),
            Json(ResetPasswordRequest {
                username: "alice".to_string(),
                password: "weak".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
