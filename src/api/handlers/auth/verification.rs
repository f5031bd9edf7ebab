use super::{
    storage,
    types::{StatusResponse, VerifyCodeRequest},
    utils,
};
use crate::api::handlers::internal_error;
use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

#[derive(Debug, PartialEq, Eq)]
enum CodeCheck {
    Valid,
    Mismatch,
    Expired,
}

/// Exact string comparison, the submitted code is not normalized. A code that
/// does not match is a mismatch even when the cycle has also expired.
fn check_code(
    stored: Option<&str>,
    expires: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> CodeCheck {
    match stored {
        Some(code) if code == submitted => {
            if expires.is_some_and(|expiry| now < expiry) {
                CodeCheck::Valid
            } else {
                CodeCheck::Expired
            }
        }
        _ => CodeCheck::Mismatch,
    }
}

/// Confirm the one-time code and activate the account.
///
/// The password reset flow confirms its code here too, the handler does not
/// distinguish activation from reset continuation.
#[utoipa::path(
    post,
    path = "/codeverification",
    tag = "account",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code accepted, account verified", body = StatusResponse),
        (status = 400, description = "Unknown username, incorrect code, or expired code", body = StatusResponse)
    )
)]
pub async fn verify_code(
    Extension(pool): Extension<PgPool>,
    Json(payload): Json<VerifyCodeRequest>,
) -> Response {
    let username = utils::decode_username(&payload.username);

    let user = match storage::find_by_username(&pool, &username).await {
        Ok(Some(user)) => user,
        Ok(None) => return bad_request("User not found"),
        Err(err) => return internal_error(&err),
    };

    match check_code(
        user.verify_code.as_deref(),
        user.verify_code_expires,
        &payload.verify_code,
        Utc::now(),
    ) {
        CodeCheck::Mismatch => return bad_request("Incorrect verification code"),
        CodeCheck::Expired => {
            return bad_request(
                "Verification code has expired. Please sign up again to get a new code.",
            );
        }
        CodeCheck::Valid => {}
    }

    if let Err(err) = storage::mark_verified(&pool, user.id).await {
        return internal_error(&err);
    }

    info!(username = %username, "account verified");

    (
        StatusCode::OK,
        Json(StatusResponse::ok("Account verified successfully")),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(StatusResponse::err(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn correct_code_before_expiry_is_valid() {
        let expires = Some(now() + Duration::hours(1));
        assert_eq!(
            check_code(Some("123456"), expires, "123456", now()),
            CodeCheck::Valid
        );
    }

    #[test]
    fn wrong_code_is_a_mismatch() {
        let expires = Some(now() + Duration::hours(1));
        assert_eq!(
            check_code(Some("123456"), expires, "654321", now()),
            CodeCheck::Mismatch
        );
    }

    #[test]
    fn correct_code_after_expiry_is_expired() {
        let expires = Some(now() - Duration::seconds(1));
        assert_eq!(
            check_code(Some("123456"), expires, "123456", now()),
            CodeCheck::Expired
        );
    }

    #[test]
    fn expiry_is_exclusive_at_the_boundary() {
        let instant = now();
        assert_eq!(
            check_code(Some("123456"), Some(instant), "123456", instant),
            CodeCheck::Expired
        );
    }

    #[test]
    fn wrong_code_on_expired_cycle_is_still_a_mismatch() {
        let expires = Some(now() - Duration::hours(1));
        assert_eq!(
            check_code(Some("123456"), expires, "654321", now()),
            CodeCheck::Mismatch
        );
    }

    #[test]
    fn submitted_code_is_not_normalized() {
        let expires = Some(now() + Duration::hours(1));
        assert_eq!(
            check_code(Some("123456"), expires, " 123456 ", now()),
            CodeCheck::Mismatch
        );
        assert_eq!(
            check_code(Some("123456"), expires, "123456\n", now()),
            CodeCheck::Mismatch
        );
    }

    #[test]
    fn no_pending_cycle_is_a_mismatch() {
        assert_eq!(
            check_code(None, None, "123456", now()),
            CodeCheck::Mismatch
        );
    }
}
