use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

pub mod auth;
pub mod health;
pub mod messages;
pub mod root;

/// Log the underlying error and return an opaque 500 to the client.
pub(crate) fn internal_error(err: &anyhow::Error) -> Response {
    error!("internal error: {err:?}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(auth::types::StatusResponse::err("Internal server error")),
    )
        .into_response()
}
