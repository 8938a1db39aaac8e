use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_AUTH_USERNAME: &str = "auth-username";
pub const ARG_AUTH_PASSWORD_HASH: &str = "auth-password-hash";
pub const ARG_SECURE_COOKIES: &str = "secure-cookies";
pub const ARG_SESSION_SWEEP_SECONDS: &str = "session-sweep-seconds";
pub const ARG_TRUST_PROXY_HEADERS: &str = "trust-proxy-headers";

#[derive(Debug)]
pub struct Options {
    pub username: String,
    pub password_hash: SecretString,
    pub secure_cookies: bool,
    pub session_sweep_seconds: u64,
    pub trust_proxy_headers: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if the admin username or password hash is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let username = matches
            .get_one::<String>(ARG_AUTH_USERNAME)
            .cloned()
            .context("missing required argument: --auth-username")?;
        let password_hash = matches
            .get_one::<String>(ARG_AUTH_PASSWORD_HASH)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --auth-password-hash")?;

        Ok(Self {
            username,
            password_hash,
            secure_cookies: matches
                .get_one::<bool>(ARG_SECURE_COOKIES)
                .copied()
                .unwrap_or(true),
            session_sweep_seconds: matches
                .get_one::<u64>(ARG_SESSION_SWEEP_SECONDS)
                .copied()
                .unwrap_or(900),
            trust_proxy_headers: matches
                .get_one::<bool>(ARG_TRUST_PROXY_HEADERS)
                .copied()
                .unwrap_or(false),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_AUTH_USERNAME)
                .long(ARG_AUTH_USERNAME)
                .help("Admin username")
                .env("MENUBOARD_AUTH_USERNAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_AUTH_PASSWORD_HASH)
                .long(ARG_AUTH_PASSWORD_HASH)
                .help("bcrypt hash of the admin password, see `menuboard hash-password`")
                .env("MENUBOARD_AUTH_PASSWORD_HASH")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIES)
                .long(ARG_SECURE_COOKIES)
                .help("Mark cookies Secure; disable only for local HTTP development")
                .env("MENUBOARD_SECURE_COOKIES")
                .action(ArgAction::Set)
                .default_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new(ARG_SESSION_SWEEP_SECONDS)
                .long(ARG_SESSION_SWEEP_SECONDS)
                .help("Interval between expired-session sweeps in seconds")
                .env("MENUBOARD_SESSION_SWEEP_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_TRUST_PROXY_HEADERS)
                .long(ARG_TRUST_PROXY_HEADERS)
                .help("Rate-limit logins by X-Forwarded-For/X-Real-IP; only behind a trusted reverse proxy")
                .env("MENUBOARD_TRUST_PROXY_HEADERS")
                .action(ArgAction::Set)
                .default_value("false")
                .value_parser(clap::value_parser!(bool)),
        )
}
