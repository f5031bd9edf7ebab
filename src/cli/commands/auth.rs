use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SESSION_SECRET: &str = "session-secret";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Public base URL used in outbound email links")
                .env("ANOMSG_BASE_URL")
                .default_value("https://anomsg.dev"),
        )
        .arg(
            Arg::new("code-ttl-seconds")
                .long("code-ttl-seconds")
                .help("Verification code TTL in seconds")
                .env("ANOMSG_CODE_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Absolute session token lifetime in seconds")
                .env("ANOMSG_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("session-refresh-seconds")
                .long("session-refresh-seconds")
                .help("Idle window after which a session cookie is reissued")
                .env("ANOMSG_SESSION_REFRESH_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session tokens")
                .env("ANOMSG_SESSION_SECRET")
                .required(true),
        )
}

pub struct Options {
    pub base_url: String,
    pub code_ttl_seconds: i64,
    pub session_ttl_seconds: i64,
    pub session_refresh_seconds: i64,
    pub session_secret: SecretString,
}

impl Options {
    /// Extract auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let base_url = matches
            .get_one::<String>("base-url")
            .cloned()
            .context("missing required argument: --base-url")?;
        let code_ttl_seconds = matches
            .get_one::<i64>("code-ttl-seconds")
            .copied()
            .unwrap_or(3600);
        let session_ttl_seconds = matches
            .get_one::<i64>("session-ttl-seconds")
            .copied()
            .unwrap_or(2_592_000);
        let session_refresh_seconds = matches
            .get_one::<i64>("session-refresh-seconds")
            .copied()
            .unwrap_or(3600);
        let session_secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --session-secret")?;

        Ok(Self {
            base_url,
            code_ttl_seconds,
            session_ttl_seconds,
            session_refresh_seconds,
            session_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn parse_defaults() -> Result<()> {
        temp_env::with_vars(
            [
                ("ANOMSG_CODE_TTL_SECONDS", None::<&str>),
                ("ANOMSG_SESSION_TTL_SECONDS", None),
                ("ANOMSG_SESSION_REFRESH_SECONDS", None),
                ("ANOMSG_BASE_URL", None),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "anomsg",
                    "--dsn",
                    "postgres://localhost/anomsg",
                    "--session-secret",
                    "top-secret",
                ]);
                let options = Options::parse(&matches)?;
                assert_eq!(options.base_url, "https://anomsg.dev");
                assert_eq!(options.code_ttl_seconds, 3600);
                assert_eq!(options.session_ttl_seconds, 2_592_000);
                assert_eq!(options.session_refresh_seconds, 3600);
                assert_eq!(options.session_secret.expose_secret(), "top-secret");
                Ok(())
            },
        )
    }

    #[test]
    fn parse_overrides() -> Result<()> {
        let command = crate::cli::commands::new();
        let matches = command.get_matches_from(vec![
            "anomsg",
            "--dsn",
            "postgres://localhost/anomsg",
            "--session-secret",
            "top-secret",
            "--base-url",
            "https://anomsg.test",
            "--code-ttl-seconds",
            "120",
            "--session-ttl-seconds",
            "3600",
            "--session-refresh-seconds",
            "60",
        ]);
        let options = Options::parse(&matches)?;
        assert_eq!(options.base_url, "https://anomsg.test");
        assert_eq!(options.code_ttl_seconds, 120);
        assert_eq!(options.session_ttl_seconds, 3600);
        assert_eq!(options.session_refresh_seconds, 60);
        Ok(())
    }
}
