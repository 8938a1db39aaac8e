//! Map validated CLI arguments to an action.

use crate::cli::actions::{hash_password, server, Action};
use crate::cli::commands::{auth, ARG_COST, CMD_HASH_PASSWORD};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub_m) = matches.subcommand_matches(CMD_HASH_PASSWORD) {
        return Ok(Action::HashPassword(hash_password::Args {
            cost: sub_m
                .get_one::<u32>(ARG_COST)
                .copied()
                .unwrap_or(crate::auth::DEFAULT_HASH_COST),
        }));
    }

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        username: auth_opts.username,
        password_hash: auth_opts.password_hash,
        secure_cookies: auth_opts.secure_cookies,
        session_sweep_seconds: auth_opts.session_sweep_seconds,
        trust_proxy_headers: auth_opts.trust_proxy_headers,
    }))
}
