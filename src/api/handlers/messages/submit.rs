use super::{storage, types::SendMessageRequest};
use crate::api::handlers::{
    auth::{storage as users, types::StatusResponse, utils, validate},
    internal_error,
};
use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use tracing::info;

/// Anonymous message submission, no session required.
#[utoipa::path(
    post,
    path = "/sendmessage",
    tag = "inbox",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message delivered", body = StatusResponse),
        (status = 400, description = "Content too short or too long", body = StatusResponse),
        (status = 401, description = "Recipient is not accepting messages", body = StatusResponse),
        (status = 404, description = "Unknown recipient", body = StatusResponse)
    )
)]
pub async fn send_message(
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<SendMessageRequest>,
) -> Response {
    let content = payload.content.trim();

    let problems = validate::validate_content(content);
    if !problems.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::err(&problems.join("; "))),
        )
            .into_response();
    }

    let username = utils::decode_username(&payload.username);

    let user = match users::find_by_username(&pool, &username).await {
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

    if !user.is_accepting_messages {
        return (
            StatusCode::UNAUTHORIZED,
            Json(StatusResponse::err("User is not accepting messages")),
        )
            .into_response();
    }

    if let Err(err) = storage::insert_message(&pool, user.id, content).await {
        return internal_error(&err);
    }

    info!(recipient = %username, "anonymous message delivered");

    (
        StatusCode::OK,
        Json(StatusResponse::ok("Message sent successfully")),
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
    async fn rejects_short_content() {
        let response = send_message(
            Extension(lazy_pool()),
            Json(SendMessageRequest {
                username: "alice".to_string(),
                content: "hi".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_oversized_content() {
        let response = send_message(
            Extension(lazy_pool()),
            Json(SendMessageRequest {
                username: "alice".to_string(),
                content: "x".repeat(501),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn trims_before_validating() {
        // Whitespace padding does not rescue a 2-char message.
        let response = send_message(
            Extension(lazy_pool()),
            Json(SendMessageRequest {
                username: "alice".to_string(),
                content: "  hi  ".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
