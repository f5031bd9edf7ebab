use super::{
    password, state::AuthState, storage,
    types::{SignUpRequest, SignUpResponse, StatusResponse},
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

/// Register a new account and send the verification code.
///
/// Re-registering an email that never completed verification replaces the
/// stale account. A verified account blocks its email and username for good.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "account",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created, verification code sent", body = SignUpResponse),
        (status = 400, description = "Validation failed or identity already taken", body = StatusResponse),
        (status = 500, description = "Internal error or email delivery failure", body = StatusResponse)
    )
)]
pub async fn signup(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    Extension(sender): Extension<Arc<dyn EmailSender>>,
    Json(payload): Json<SignUpRequest>,
) -> Response {
    let mut problems = validate::validate_username(&payload.username);
    problems.extend(validate::validate_email(&payload.email));
    problems.extend(validate::validate_password(&payload.password));

    if !problems.is_empty() {
        return bad_request(&problems.join("; "));
    }

    let email_address = utils::normalize_email(&payload.email);

    match storage::find_verified_by_username(&pool, &payload.username).await {
        Ok(Some(_)) => return bad_request("Username is already taken"),
        Ok(None) => {}
        Err(err) => return internal_error(&err),
    }

    let password_hash = match password::hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => return internal_error(&err),
    };

    let code = utils::generate_verify_code();
    let expires = Utc::now() + Duration::seconds(auth.config().code_ttl_seconds());

    let existing = match storage::find_by_email(&pool, &email_address).await {
        Ok(existing) => existing,
        Err(err) => return internal_error(&err),
    };

    match existing {
        Some(user) if user.is_verified => {
            return bad_request("An account already exists with this email");
        }
        Some(user) => {
            let result = storage::update_unverified_account(
                &pool,
                user.id,
                &payload.username,
                &password_hash,
                &code,
                expires,
            )
            .await;

            if let Some(response) = overwrite_conflict(result) {
                return response;
            }
        }
        None => {
            if let Err(err) = storage::insert_user(
                &pool,
                &payload.username,
                &email_address,
                &password_hash,
                &code,
                expires,
            )
            .await
            {
                return map_conflict(&err);
            }
        }
    }

    info!(username = %payload.username, "account registered, sending verification code");

    let message = EmailMessage::verification(&email_address, &payload.username, &code);
    if let Err(err) = sender.send(message).await {
        tracing::error!("verification email failed: {err:?}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::err(
                "Account created but the verification email could not be sent. \
                 Request a new code to try again.",
            )),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(SignUpResponse {
            success: true,
            message: "User registered successfully. Please verify your account.".to_string(),
            username: payload.username,
        }),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(StatusResponse::err(message))).into_response()
}

fn map_conflict(err: &sqlx::Error) -> Response {
    match utils::unique_violation(err).as_deref() {
        Some(constraint) if constraint.contains("email") => {
            bad_request("An account already exists with this email")
        }
        Some(_) => bad_request("Username is already taken"),
        None => internal_error(&anyhow::anyhow!("signup write failed: {err}")),
    }
}

// Zero rows touched means the account got verified while this request was in
// flight; report the email conflict instead of mailing a code that was never
// stored.
fn overwrite_conflict(result: Result<bool, sqlx::Error>) -> Option<Response> {
    match result {
        Ok(true) => None,
        Ok(false) => Some(bad_request("An account already exists with this email")),
        Err(err) => Some(map_conflict(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{email::LogEmailSender, handlers::auth::AuthConfig};
    use secrecy::SecretString;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/anomsg").expect("lazy pool")
    }

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new(
            "https://anomsg.dev".to_string(),
            SecretString::from("0123456789abcdef0123456789abcdef"),
        );
        Arc::new(AuthState::new(config).expect("auth state"))
    }

    fn sender() -> Arc<dyn EmailSender> {
        Arc::new(LogEmailSender::new("onboarding@resend.dev".to_string()))
    }

    #[test]
    fn lost_verification_race_is_an_email_conflict() {
        let response = overwrite_conflict(Ok(false));
        assert!(response.is_some());
        if let Some(response) = response {
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn successful_overwrite_is_not_a_conflict() {
        assert!(overwrite_conflict(Ok(true)).is_none());
    }

    #[tokio::test]
    async fn rejects_invalid_payload() {
        let response = signup(
            Extension(lazy_pool()),
            Extension(auth_state()),
            Extension(sender()),
            Json(SignUpRequest {
                username: "a!".to_string(),
                email: "not-an-email".to_string(),
                password: "weak".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
