//! Tunables for sessions, CSRF tokens, and login limiting.

use chrono::Duration;

use super::rate_limit::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_SECONDS};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_CSRF_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 15 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_ttl_seconds: i64,
    csrf_ttl_seconds: i64,
    sweep_interval_seconds: u64,
    login_window_seconds: i64,
    max_login_attempts: u32,
    secure_cookies: bool,
    trust_proxy_headers: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            csrf_ttl_seconds: DEFAULT_CSRF_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
            login_window_seconds: DEFAULT_WINDOW_SECONDS,
            max_login_attempts: DEFAULT_MAX_ATTEMPTS,
            secure_cookies: true,
            trust_proxy_headers: false,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_csrf_ttl_seconds(mut self, seconds: i64) -> Self {
        self.csrf_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_sweep_interval_seconds(mut self, seconds: u64) -> Self {
        self.sweep_interval_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_login_window_seconds(mut self, seconds: i64) -> Self {
        self.login_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_max_login_attempts(mut self, attempts: u32) -> Self {
        self.max_login_attempts = attempts;
        self
    }

    /// `Secure` is only set on cookies when serving over HTTPS in production.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Key login limiting on `X-Forwarded-For`/`X-Real-IP` instead of the peer
    /// address. Only enable behind a reverse proxy that overwrites them.
    #[must_use]
    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn csrf_ttl_seconds(&self) -> i64 {
        self.csrf_ttl_seconds
    }

    #[must_use]
    pub fn sweep_interval_seconds(&self) -> u64 {
        self.sweep_interval_seconds
    }

    #[must_use]
    pub fn max_login_attempts(&self) -> u32 {
        self.max_login_attempts
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    #[must_use]
    pub fn trust_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }

    pub(super) fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_seconds)
    }

    pub(super) fn login_window(&self) -> Duration {
        Duration::seconds(self.login_window_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new();

        assert_eq!(config.session_ttl_seconds(), 86_400);
        assert_eq!(config.csrf_ttl_seconds(), 900);
        assert_eq!(config.sweep_interval_seconds(), 900);
        assert_eq!(config.login_window(), Duration::minutes(15));
        assert_eq!(config.max_login_attempts(), 5);
        assert!(config.secure_cookies());
        assert!(!config.trust_proxy_headers());

        let config = config
            .with_session_ttl_seconds(60)
            .with_csrf_ttl_seconds(30)
            .with_sweep_interval_seconds(10)
            .with_login_window_seconds(120)
            .with_max_login_attempts(2)
            .with_secure_cookies(false)
            .with_trust_proxy_headers(true);

        assert_eq!(config.session_ttl(), Duration::minutes(1));
        assert_eq!(config.csrf_ttl_seconds(), 30);
        assert_eq!(config.sweep_interval_seconds(), 10);
        assert_eq!(config.login_window(), Duration::minutes(2));
        assert_eq!(config.max_login_attempts(), 2);
        assert!(!config.secure_cookies());
        assert!(config.trust_proxy_headers());
    }
}
