//! Inbox management, every handler here requires a session.

use super::{
    storage,
    types::{AcceptStatusResponse, AcceptUpdateRequest, GetMessagesResponse, MessageOut},
};
use crate::api::handlers::{
    auth::{
        AuthState, session,
        storage as users,
        types::StatusResponse,
    },
    internal_error,
};
use axum::{
    Extension, Json,
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Inbox listing, newest first. An empty inbox is a success.
#[utoipa::path(
    get,
    path = "/getmessages",
    tag = "inbox",
    responses(
        (status = 200, description = "Messages for the signed-in user", body = GetMessagesResponse),
        (status = 401, description = "Not authenticated", body = StatusResponse)
    )
)]
pub async fn get_messages(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    let claims = match session::require_session(&auth, &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let messages = match storage::list_messages(&pool, claims.sub).await {
        Ok(rows) => rows
            .into_iter()
            .map(|row| MessageOut {
                id: row.id,
                content: row.content,
                created_at: row.created_at,
            })
            .collect(),
        Err(err) => return internal_error(&err),
    };

    let mut response = (
        StatusCode::OK,
        Json(GetMessagesResponse {
            success: true,
            messages,
        }),
    )
        .into_response();

    session::refresh_session(&auth, &claims, &mut response);

    response
}

/// Current accept/reject state of the inbox.
#[utoipa::path(
    get,
    path = "/acceptmessage",
    tag = "inbox",
    responses(
        (status = 200, description = "Current acceptance state", body = AcceptStatusResponse),
        (status = 401, description = "Not authenticated", body = StatusResponse),
        (status = 404, description = "Account no longer exists", body = StatusResponse)
    )
)]
pub async fn accept_status(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    let claims = match session::require_session(&auth, &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let user = match users::find_by_id(&pool, claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => return user_gone(),
        Err(err) => return internal_error(&err),
    };

    let mut response = (
        StatusCode::OK,
        Json(AcceptStatusResponse {
            success: true,
            message: "Acceptance status fetched".to_string(),
            is_accepting_messages: user.is_accepting_messages,
        }),
    )
        .into_response();

    session::refresh_session(&auth, &claims, &mut response);

    response
}

/// Flip the accept/reject toggle.
#[utoipa::path(
    post,
    path = "/acceptmessage",
    tag = "inbox",
    request_body = AcceptUpdateRequest,
    responses(
        (status = 200, description = "Acceptance state updated", body = AcceptStatusResponse),
        (status = 401, description = "Not authenticated", body = StatusResponse),
        (status = 404, description = "Account no longer exists", body = StatusResponse)
    )
)]
pub async fn accept_update(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Json(payload): Json<AcceptUpdateRequest>,
) -> Response {
    let claims = match session::require_session(&auth, &headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    match users::set_accepting_messages(&pool, claims.sub, payload.accept_message).await {
        Ok(true) => {}
        Ok(false) => return user_gone(),
        Err(err) => return internal_error(&err),
    }

    info!(
        username = %claims.username,
        accepting = payload.accept_message,
        "message acceptance updated"
    );

    let mut response = (
        StatusCode::OK,
        Json(AcceptStatusResponse {
            success: true,
            message: "Acceptance status updated".to_string(),
            is_accepting_messages: payload.accept_message,
        }),
    )
        .into_response();

    session::refresh_session(&auth, &claims, &mut response);

    response
}

/// Delete one message from the inbox.
#[utoipa::path(
    delete,
    path = "/delete-message/{message_id}",
    tag = "inbox",
    params(
        ("message_id" = Uuid, Path, description = "Message to delete")
    ),
    responses(
        (status = 200, description = "Message deleted", body = StatusResponse),
        (status = 401, description = "Not authenticated", body = StatusResponse),
        (status = 404, description = "No such message in this inbox", body = StatusResponse)
    )
)]
pub async fn delete_message(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(message_id): Path<Uuid>,
) -> Response {
    delete_message_inner(&pool, &auth, &headers, message_id).await
}

/// POST alias for clients that cannot issue DELETE.
pub async fn delete_message_post(
    Extension(pool): Extension<PgPool>,
    Extension(auth): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(message_id): Path<Uuid>,
) -> Response {
    delete_message_inner(&pool, &auth, &headers, message_id).await
}

async fn delete_message_inner(
    pool: &PgPool,
    auth: &AuthState,
    headers: &HeaderMap,
    message_id: Uuid,
) -> Response {
    let claims = match session::require_session(auth, headers) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    // Scoped to the session owner, a foreign id looks identical to a missing one.
    match storage::delete_message(pool, claims.sub, message_id).await {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Json(StatusResponse::err("Message not found")),
            )
                .into_response();
        }
        Err(err) => return internal_error(&err),
    }

    info!(username = %claims.username, %message_id, "message deleted");

    let mut response = (
        StatusCode::OK,
        Json(StatusResponse::ok("Message deleted")),
    )
        .into_response();

    session::refresh_session(auth, &claims, &mut response);

    response
}

fn user_gone() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(StatusResponse::err("User not found")),
    )
        .into_response()
}
