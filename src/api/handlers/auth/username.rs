use super::{
    storage,
    types::{StatusResponse, UniqueUsernameQuery},
    utils, validate,
};
use crate::api::handlers::internal_error;
use axum::{
    Extension, Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;

/// Report whether a username is still available.
///
/// Only verified accounts reserve a name, an unverified signup can be
/// displaced by whoever verifies first.
#[utoipa::path(
    get,
    path = "/uniqueusername",
    tag = "account",
    params(
        ("username" = String, Query, description = "Username to check")
    ),
    responses(
        (status = 200, description = "Username is available", body = StatusResponse),
        (status = 400, description = "Username invalid or already taken", body = StatusResponse)
    )
)]
pub async fn unique_username(
    Extension(pool): Extension<PgPool>,
    Query(query): Query<UniqueUsernameQuery>,
) -> Response {
    let username = utils::decode_username(&query.username);

    let problems = validate::validate_username(&username);
    if !problems.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::err(&problems.join("; "))),
        )
            .into_response();
    }

    match storage::find_verified_by_username(&pool, &username).await {
        Ok(Some(_)) => (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse::err("Username is already taken")),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(StatusResponse::ok("Username is available")),
        )
            .into_response(),
        Err(err) => internal_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/anomsg").expect("lazy pool")
    }

    #[tokio::test]
    async fn rejects_invalid_username_shape() {
        let response = unique_username(
            Extension(lazy_pool()),
            Query(UniqueUsernameQuery {
                username: "a!".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn decodes_percent_escapes_before_validating() {
        // "al%20ice" decodes to "al ice", which fails the charset rule.
        let response = unique_username(
            Extension(lazy_pool()),
            Query(UniqueUsernameQuery {
                username: "al%20ice".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
