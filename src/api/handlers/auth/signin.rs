use super::{
    password, session,
    state::AuthState,
    storage,
    types::{SignInRequest, SignInResponse, StatusResponse},
    utils,
};
use crate::api::handlers::internal_error;
use axum::{
    Extension, Json,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Authenticate with email and password, sets the session cookie.
#[utoipa::path(
    post,
    path = "/signin",
    tag = "account",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = SignInResponse),
        (status = 400, description = "No account for this email", body = StatusResponse),
        (status = 401, description = "Wrong password or account not verified", body = StatusResponse)
    )
)]
pub async fn signin(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    Json(payload): Json<SignInRequest>,
) -> Response {
    let email_address = utils::normalize_email(&payload.email);

    let user = match storage::find_by_email(&pool, &email_address).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(StatusResponse::err("No account found for this email")),
            )
                .into_response();
        }
        Err(err) => return internal_error(&err),
    };

    if !user.is_verified {
        return unauthorized("Please verify your account before signing in");
    }

    let matches = match password::verify_password(&payload.password, &user.password_hash) {
        Ok(matches) => matches,
        Err(err) => return internal_error(&err),
    };

    if !matches {
        return unauthorized("Incorrect password");
    }

    let cookie = match session::issue_token(&auth, user.id, &user.username, user.is_verified)
        .and_then(|token| session::session_cookie(&auth, &token))
    {
        Ok(cookie) => cookie,
        Err(err) => return internal_error(&err),
    };

    info!(username = %user.username, "user signed in");

    let mut response = (
        StatusCode::OK,
        Json(SignInResponse {
            success: true,
            message: "Signed in successfully".to_string(),
            username: user.username,
            is_verified: user.is_verified,
        }),
    )
        .into_response();

    response.headers_mut().insert(SET_COOKIE, cookie);

    response
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(StatusResponse::err(message)),
    )
        .into_response()
}
