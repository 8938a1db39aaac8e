use crate::auth::{AuthConfig, Credentials, SessionAuthority};
use crate::menuboard;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub username: String,
    pub password_hash: SecretString,
    pub secure_cookies: bool,
    pub session_sweep_seconds: u64,
    pub trust_proxy_headers: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the credential configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let credentials = Credentials::new(args.username, args.password_hash)
        .context("Failed to load admin credentials")?;

    if !args.secure_cookies {
        warn!("Secure cookie flag disabled; only use this for local HTTP development");
    }

    let config = AuthConfig::new()
        .with_secure_cookies(args.secure_cookies)
        .with_sweep_interval_seconds(args.session_sweep_seconds)
        .with_trust_proxy_headers(args.trust_proxy_headers);

    if args.trust_proxy_headers {
        warn!("Trusting proxy headers for login rate limiting");
    }

    debug!("Admin user: {}", credentials.username());

    let auth = Arc::new(SessionAuthority::new(config, credentials));

    menuboard::new(args.port, auth).await
}
