use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Undocumented root, handy for smoke checks behind a load balancer.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
