use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("resend-api-key")
                .long("resend-api-key")
                .help("Resend API key; when absent, outbound email is logged instead of sent")
                .env("ANOMSG_RESEND_API_KEY"),
        )
        .arg(
            Arg::new("email-from")
                .long("email-from")
                .help("From address for verification and reset emails")
                .env("ANOMSG_EMAIL_FROM")
                .default_value("onboarding@resend.dev"),
        )
}

pub struct Options {
    pub resend_api_key: Option<SecretString>,
    pub from_address: String,
}

impl Options {
    /// Extract email options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if the from address is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let resend_api_key = matches
            .get_one::<String>("resend-api-key")
            .cloned()
            .map(SecretString::from);
        let from_address = matches
            .get_one::<String>("email-from")
            .cloned()
            .context("missing required argument: --email-from")?;

        Ok(Self {
            resend_api_key,
            from_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_without_api_key() -> Result<()> {
        temp_env::with_vars(
            [
                ("ANOMSG_RESEND_API_KEY", None::<&str>),
                ("ANOMSG_EMAIL_FROM", None),
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
                assert!(options.resend_api_key.is_none());
                assert_eq!(options.from_address, "onboarding@resend.dev");
                Ok(())
            },
        )
    }

    #[test]
    fn parse_with_api_key() -> Result<()> {
        let command = crate::cli::commands::new();
        let matches = command.get_matches_from(vec![
            "anomsg",
            "--dsn",
            "postgres://localhost/anomsg",
            "--session-secret",
            "top-secret",
            "--resend-api-key",
            "re_123",
            "--email-from",
            "hello@anomsg.dev",
        ]);
        let options = Options::parse(&matches)?;
        assert!(options.resend_api_key.is_some());
        assert_eq!(options.from_address, "hello@anomsg.dev");
        Ok(())
    }
}
