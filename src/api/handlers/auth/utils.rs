use percent_encoding::percent_decode_str;
use rand::Rng;

/// Emails are matched case-insensitively, store them lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Six digit one-time code, never starts with zero.
#[must_use]
pub fn generate_verify_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Usernames arrive URL-encoded in path and query positions.
#[must_use]
pub fn decode_username(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map_or_else(|_| raw.to_string(), |decoded| decoded.into_owned())
}

/// Postgres unique violations carry SQLSTATE 23505.
#[must_use]
pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;

    if db_err.code().as_deref() == Some("23505") {
        Some(db_err.constraint().unwrap_or("unknown").to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn verify_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_verify_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn decode_username_handles_percent_escapes() {
        assert_eq!(decode_username("alice%5F01"), "alice_01");
        assert_eq!(decode_username("alice"), "alice");
    }
}
