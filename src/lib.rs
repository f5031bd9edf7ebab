//! # Anomsg (anonymous messaging backend)
//!
//! `anomsg` is the HTTP API behind the anonymous-messaging frontend. Users
//! register with a username/email/password, prove control of the email with a
//! one-time 6-digit code, and then receive anonymous messages at a public
//! link tied to their username.
//!
//! ## Account lifecycle
//!
//! - **Signup** creates an unverified user with a pending verification code.
//!   Re-registering an unverified email refreshes the code instead of creating
//!   a duplicate row; verified identities are conflicts.
//! - **Verification** flips the user to verified once the submitted code
//!   matches and has not expired. The same endpoint confirms password-reset
//!   codes; the server does not distinguish the two flows.
//! - **Sign-in** checks the argon2 password hash and issues a self-contained
//!   HS256 session token as an `HttpOnly` cookie. There is no server-side
//!   session store; logout is client-side token discardal.
//!
//! ## Inbox
//!
//! Messages are rows in a child table keyed by recipient, appended by the
//! public send endpoint (gated by the per-user accept flag) and deleted by id,
//! scoped to the authenticated owner.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
