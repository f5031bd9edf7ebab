use crate::GIT_COMMIT_HASH;
use axum::{
    Extension,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::{Instrument, error, info_span};

/// Service health, verifies the database connection.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Database is unreachable")
    )
)]
pub async fn health(Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();

    let app = format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        GIT_COMMIT_HASH,
    );

    if let Ok(app_header) = HeaderValue::from_str(&app) {
        headers.insert("X-App", app_header);
    }

    let span = info_span!("db.query", db.system = "postgresql", db.operation = "select");

    match sqlx::query("SELECT 1")
        .execute(&pool)
        .instrument(span)
        .await
    {
        Ok(_) => (StatusCode::OK, headers),
        Err(err) => {
            error!("database health check failed: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, headers)
        }
    }
}
