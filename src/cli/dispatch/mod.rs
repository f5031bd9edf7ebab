//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, email};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let email_opts = email::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        base_url: auth_opts.base_url,
        code_ttl_seconds: auth_opts.code_ttl_seconds,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        session_refresh_seconds: auth_opts.session_refresh_seconds,
        session_secret: auth_opts.session_secret,
        resend_api_key: email_opts.resend_api_key,
        email_from: email_opts.from_address,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_builds_server_action() -> Result<()> {
        temp_env::with_vars(
            [
                ("ANOMSG_PORT", None::<&str>),
                ("ANOMSG_BASE_URL", None),
                ("ANOMSG_CODE_TTL_SECONDS", None),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "anomsg",
                    "--dsn",
                    "postgres://user@localhost:5432/anomsg",
                    "--session-secret",
                    "top-secret",
                ]);
                let Action::Server(args) = handler(&matches)?;
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/anomsg");
                assert_eq!(args.code_ttl_seconds, 3600);
                assert!(args.resend_api_key.is_none());
                Ok(())
            },
        )
    }
}
