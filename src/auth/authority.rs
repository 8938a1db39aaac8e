//! `SessionAuthority`: the single owner of credentials, sessions, CSRF tokens,
//! and the login rate limiter.

use axum::http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use super::{
    clock::{Clock, SystemClock},
    config::AuthConfig,
    cookies::{build_cookie, clear_cookie, CSRF_COOKIE_NAME, SESSION_COOKIE_NAME},
    credentials::Credentials,
    csrf::validate_csrf_token,
    error::AuthError,
    rate_limit::{LoginRateLimiter, RateLimitDecision},
    session::{SessionCheck, SessionStore},
    token::{generate_token, OsTokenSource, TokenSource},
};

/// A freshly minted token plus the `Set-Cookie` value that carries it.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub set_cookie: HeaderValue,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Everything the login handler extracted from the request.
#[derive(Debug, Default)]
pub struct LoginAttempt {
    /// Client address used as the rate-limit key.
    pub client: String,
    pub csrf_cookie: Option<String>,
    pub csrf_form: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

#[derive(Debug)]
pub enum LoginOutcome {
    InvalidCsrf,
    RateLimited,
    MissingFields,
    InvalidCredentials,
    Success(IssuedToken),
}

pub struct SessionAuthority {
    config: AuthConfig,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenSource>,
    sessions: SessionStore,
    rate_limiter: LoginRateLimiter,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl SessionAuthority {
    /// Authority backed by the system clock and the OS random source.
    #[must_use]
    pub fn new(config: AuthConfig, credentials: Credentials) -> Self {
        Self::with_capabilities(
            config,
            credentials,
            Arc::new(SystemClock),
            Arc::new(OsTokenSource),
        )
    }

    #[must_use]
    pub fn with_capabilities(
        config: AuthConfig,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        let rate_limiter = LoginRateLimiter::new(config.max_login_attempts(), config.login_window());
        Self {
            config,
            credentials,
            clock,
            tokens,
            sessions: SessionStore::new(),
            rate_limiter,
            sweeper: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Spawn the periodic expiry sweep. Calling it again while running is a no-op.
    ///
    /// The task only holds a weak reference, so it ends on its own once the
    /// last `Arc` is dropped.
    pub fn start(self: &Arc<Self>) {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let period = Duration::from_secs(self.config.sweep_interval_seconds().max(1));
        let authority = Arc::downgrade(self);

        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(authority) = authority.upgrade() else {
                    break;
                };
                let removed = authority.sweep_expired().await;
                if removed > 0 {
                    debug!("Swept {removed} expired sessions");
                }
                let pruned = authority.prune_login_attempts().await;
                if pruned > 0 {
                    debug!("Pruned {pruned} idle rate-limit entries");
                }
            }
        }));

        info!("Session sweep every {}s", period.as_secs());
    }

    /// Stop the expiry sweep if it is running.
    pub fn stop(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("Session sweep stopped");
        }
    }

    /// Remove every expired session now.
    pub async fn sweep_expired(&self) -> usize {
        self.sessions.sweep(self.clock.now()).await
    }

    /// Forget rate-limit entries for clients idle longer than the login window.
    pub async fn prune_login_attempts(&self) -> usize {
        self.rate_limiter.prune(self.clock.now()).await
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.len().await
    }

    /// Attempts currently charged against `client`.
    pub async fn login_attempts(&self, client: &str) -> u32 {
        self.rate_limiter.attempts(client).await
    }

    pub async fn validate_credentials(&self, username: &str, password: &SecretString) -> bool {
        self.credentials.verify(username, password).await
    }

    /// Start a new session. The raw token is only handed back for the cookie.
    ///
    /// # Errors
    /// Returns an error if the random source fails or the cookie cannot be built.
    pub async fn create_session(&self) -> Result<IssuedToken, AuthError> {
        let token = generate_token(self.tokens.as_ref())?;
        let set_cookie = self.session_cookie(&token)?;
        let expires_at = self.clock.now() + self.config.session_ttl();
        self.sessions.insert(token.clone(), expires_at).await;
        Ok(IssuedToken { token, set_cookie })
    }

    /// Check a session token and extend it on success.
    ///
    /// This is not read-only: a valid session slides its expiry forward and an
    /// expired one is deleted.
    pub async fn validate_session(&self, token: Option<&str>) -> SessionCheck {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return SessionCheck::Missing;
        };
        self.sessions
            .touch(token, self.clock.now(), self.config.session_ttl())
            .await
    }

    /// End a session. Always returns a cookie that clears the browser copy,
    /// whether or not the session existed.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidCookie` if the clearing cookie cannot be built.
    pub async fn destroy_session(&self, token: Option<&str>) -> Result<HeaderValue, AuthError> {
        if let Some(token) = token {
            self.sessions.remove(token).await;
        }
        self.clear_session_cookie()
    }

    /// # Errors
    /// Returns `AuthError::InvalidCookie` if the cookie cannot be built.
    pub fn clear_session_cookie(&self) -> Result<HeaderValue, AuthError> {
        clear_cookie(SESSION_COOKIE_NAME, self.config.secure_cookies())
            .map_err(|err| AuthError::InvalidCookie(err.to_string()))
    }

    /// Mint a CSRF token for a login form.
    ///
    /// # Errors
    /// Returns an error if the random source fails or the cookie cannot be built.
    pub fn create_csrf_token(&self) -> Result<IssuedToken, AuthError> {
        let token = generate_token(self.tokens.as_ref())?;
        let set_cookie = build_cookie(
            CSRF_COOKIE_NAME,
            &token,
            self.config.csrf_ttl_seconds(),
            self.config.secure_cookies(),
        )
        .map_err(|err| AuthError::InvalidCookie(err.to_string()))?;
        Ok(IssuedToken { token, set_cookie })
    }

    #[must_use]
    pub fn validate_csrf_token(&self, cookie_value: Option<&str>, form_value: Option<&str>) -> bool {
        validate_csrf_token(cookie_value, form_value)
    }

    /// Run a login submission through CSRF, rate limit, presence, and
    /// credential checks, in that order. Each failed check short-circuits the
    /// rest.
    ///
    /// # Errors
    /// Only fails when credentials were accepted but the session could not be
    /// created.
    #[instrument(skip_all, fields(client = %attempt.client))]
    pub async fn login(&self, attempt: LoginAttempt) -> Result<LoginOutcome, AuthError> {
        if !self.validate_csrf_token(attempt.csrf_cookie.as_deref(), attempt.csrf_form.as_deref()) {
            warn!("Login rejected: invalid CSRF token");
            return Ok(LoginOutcome::InvalidCsrf);
        }

        if self
            .rate_limiter
            .check_and_register(&attempt.client, self.clock.now())
            .await
            == RateLimitDecision::Limited
        {
            warn!("Login rejected: too many attempts");
            return Ok(LoginOutcome::RateLimited);
        }

        let username = attempt.username.filter(|username| !username.is_empty());
        let password = attempt
            .password
            .filter(|password| !password.expose_secret().is_empty());
        let (Some(username), Some(password)) = (username, password) else {
            return Ok(LoginOutcome::MissingFields);
        };

        if !self.validate_credentials(&username, &password).await {
            warn!("Login rejected: invalid credentials");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        self.rate_limiter.reset(&attempt.client).await;
        let session = self.create_session().await?;
        info!("Login succeeded");

        Ok(LoginOutcome::Success(session))
    }

    fn session_cookie(&self, token: &str) -> Result<HeaderValue, AuthError> {
        build_cookie(
            SESSION_COOKIE_NAME,
            token,
            self.config.session_ttl_seconds(),
            self.config.secure_cookies(),
        )
        .map_err(|err| AuthError::InvalidCookie(err.to_string()))
    }
}

impl Drop for SessionAuthority {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::credentials::hash_password;
    use crate::auth::token::tests::{CountingTokenSource, FailingTokenSource};
    use chrono::Duration as ChronoDuration;

    const USERNAME: &str = "admin";
    const PASSWORD: &str = "s3cret-menu";
    const CLIENT: &str = "203.0.113.7";

    fn credentials() -> Credentials {
        let hash = hash_password(&SecretString::from(PASSWORD.to_string()), 4).unwrap_or_default();
        Credentials::new(USERNAME.to_string(), SecretString::from(hash))
            .unwrap_or_else(|err| panic!("test credentials: {err}"))
    }

    fn authority() -> (Arc<SessionAuthority>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let authority = SessionAuthority::with_capabilities(
            AuthConfig::new().with_secure_cookies(false),
            credentials(),
            clock.clone(),
            Arc::new(CountingTokenSource::default()),
        );
        (Arc::new(authority), clock)
    }

    fn attempt(csrf: &str, username: &str, password: &str) -> LoginAttempt {
        LoginAttempt {
            client: CLIENT.to_string(),
            csrf_cookie: Some(csrf.to_string()),
            csrf_form: Some(csrf.to_string()),
            username: Some(username.to_string()),
            password: Some(SecretString::from(password.to_string())),
        }
    }

    #[tokio::test]
    async fn new_session_is_valid_until_ttl_elapses() {
        let (auth, clock) = authority();
        let issued = auth.create_session().await.ok();
        let token = issued.as_ref().map(|issued| issued.token.clone());
        assert_eq!(token.as_ref().map(String::len), Some(64));

        assert!(auth.validate_session(token.as_deref()).await.is_valid());

        clock.advance(ChronoDuration::hours(24) + ChronoDuration::seconds(1));
        assert_eq!(
            auth.validate_session(token.as_deref()).await,
            SessionCheck::Expired
        );
        assert_eq!(auth.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn untouched_session_expires_exactly_at_ttl() {
        let (auth, clock) = authority();
        let token = auth.create_session().await.ok().map(|issued| issued.token);

        clock.advance(ChronoDuration::hours(24));
        assert_eq!(
            auth.validate_session(token.as_deref()).await,
            SessionCheck::Expired
        );
    }

    #[tokio::test]
    async fn validation_slides_the_window() {
        let (auth, clock) = authority();
        let token = auth.create_session().await.ok().map(|issued| issued.token);

        assert!(auth.validate_session(token.as_deref()).await.is_valid());
        clock.advance(ChronoDuration::hours(1));
        assert!(auth.validate_session(token.as_deref()).await.is_valid());
        clock.advance(ChronoDuration::hours(23));
        assert!(auth.validate_session(token.as_deref()).await.is_valid());
    }

    #[tokio::test]
    async fn missing_or_unknown_token_is_not_valid() {
        let (auth, _clock) = authority();
        assert_eq!(auth.validate_session(None).await, SessionCheck::Missing);
        assert_eq!(auth.validate_session(Some("")).await, SessionCheck::Missing);
        assert_eq!(
            auth.validate_session(Some("deadbeef")).await,
            SessionCheck::Missing
        );
    }

    #[tokio::test]
    async fn destroyed_session_no_longer_validates() {
        let (auth, _clock) = authority();
        let token = auth.create_session().await.ok().map(|issued| issued.token);

        let cookie = auth.destroy_session(token.as_deref()).await.ok();
        assert!(cookie
            .as_ref()
            .and_then(|c| c.to_str().ok())
            .is_some_and(|c| c.starts_with("session=;") && c.contains("Max-Age=0")));
        assert!(!auth.validate_session(token.as_deref()).await.is_valid());
    }

    #[tokio::test]
    async fn destroy_without_session_still_clears_cookie() {
        let (auth, _clock) = authority();
        assert!(auth.destroy_session(None).await.is_ok());
        assert!(auth.destroy_session(Some("unknown")).await.is_ok());
    }

    #[tokio::test]
    async fn csrf_tokens_are_distinct_and_carry_cookie() {
        let (auth, _clock) = authority();
        let first = auth.create_csrf_token().ok();
        let second = auth.create_csrf_token().ok();

        let first_token = first.as_ref().map(|issued| issued.token.clone());
        assert_ne!(first_token, second.map(|issued| issued.token));
        assert!(first
            .as_ref()
            .and_then(|issued| issued.set_cookie.to_str().ok())
            .is_some_and(|c| c.starts_with("csrf=") && c.contains("Max-Age=900")));
        assert!(auth.validate_csrf_token(first_token.as_deref(), first_token.as_deref()));
    }

    #[tokio::test]
    async fn token_source_failure_surfaces_as_error() {
        let authority = SessionAuthority::with_capabilities(
            AuthConfig::new(),
            credentials(),
            Arc::new(ManualClock::default()),
            Arc::new(FailingTokenSource),
        );
        assert!(matches!(
            authority.create_session().await,
            Err(AuthError::TokenGeneration(_))
        ));
        assert!(authority.create_csrf_token().is_err());
    }

    #[tokio::test]
    async fn login_succeeds_and_issues_session() {
        let (auth, _clock) = authority();
        let issued = match auth.login(attempt("tok", USERNAME, PASSWORD)).await {
            Ok(LoginOutcome::Success(issued)) => issued,
            other => panic!("expected success, got {other:?}"),
        };
        assert!(issued
            .set_cookie
            .to_str()
            .is_ok_and(|c| c.starts_with("session=") && c.contains("SameSite=Strict")));
        assert!(auth
            .validate_session(Some(issued.token.as_str()))
            .await
            .is_valid());
        assert_eq!(auth.login_attempts(CLIENT).await, 0);
    }

    #[tokio::test]
    async fn bad_csrf_short_circuits_before_rate_limiter() {
        let (auth, _clock) = authority();
        let mut bad = attempt("tok", USERNAME, PASSWORD);
        bad.csrf_form = Some("other".to_string());

        assert!(matches!(auth.login(bad).await, Ok(LoginOutcome::InvalidCsrf)));

        let mut missing = attempt("tok", USERNAME, PASSWORD);
        missing.csrf_cookie = None;
        assert!(matches!(
            auth.login(missing).await,
            Ok(LoginOutcome::InvalidCsrf)
        ));

        assert_eq!(auth.login_attempts(CLIENT).await, 0);
    }

    #[tokio::test]
    async fn missing_fields_are_reported_after_rate_limit() {
        let (auth, _clock) = authority();
        assert!(matches!(
            auth.login(attempt("tok", "", PASSWORD)).await,
            Ok(LoginOutcome::MissingFields)
        ));
        assert!(matches!(
            auth.login(attempt("tok", USERNAME, "")).await,
            Ok(LoginOutcome::MissingFields)
        ));
        assert_eq!(auth.login_attempts(CLIENT).await, 2);
    }

    #[tokio::test]
    async fn wrong_username_and_wrong_password_look_the_same() {
        let (auth, _clock) = authority();
        assert!(matches!(
            auth.login(attempt("tok", "root", PASSWORD)).await,
            Ok(LoginOutcome::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(attempt("tok", USERNAME, "nope")).await,
            Ok(LoginOutcome::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn sixth_attempt_is_limited_even_with_correct_credentials() {
        let (auth, clock) = authority();
        for _ in 0..5 {
            assert!(matches!(
                auth.login(attempt("tok", USERNAME, "wrong")).await,
                Ok(LoginOutcome::InvalidCredentials)
            ));
            clock.advance(ChronoDuration::minutes(1));
        }

        assert!(matches!(
            auth.login(attempt("tok", USERNAME, PASSWORD)).await,
            Ok(LoginOutcome::RateLimited)
        ));
        assert_eq!(auth.login_attempts(CLIENT).await, 5);

        // Window counts from the last accepted attempt.
        clock.advance(ChronoDuration::minutes(16));
        assert!(matches!(
            auth.login(attempt("tok", USERNAME, PASSWORD)).await,
            Ok(LoginOutcome::Success(_))
        ));
        assert_eq!(auth.login_attempts(CLIENT).await, 0);
    }

    #[tokio::test]
    async fn success_resets_counter_fully() {
        let (auth, _clock) = authority();
        for _ in 0..4 {
            let _ = auth.login(attempt("tok", USERNAME, "wrong")).await;
        }
        assert_eq!(auth.login_attempts(CLIENT).await, 4);

        assert!(matches!(
            auth.login(attempt("tok", USERNAME, PASSWORD)).await,
            Ok(LoginOutcome::Success(_))
        ));
        assert_eq!(auth.login_attempts(CLIENT).await, 0);
    }

    #[tokio::test]
    async fn sweep_expired_removes_abandoned_sessions() {
        let (auth, clock) = authority();
        let _ = auth.create_session().await;
        clock.advance(ChronoDuration::hours(12));
        let _ = auth.create_session().await;
        clock.advance(ChronoDuration::hours(13));

        assert_eq!(auth.sweep_expired().await, 1);
        assert_eq!(auth.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn idle_login_attempts_are_pruned() {
        let (auth, clock) = authority();
        let _ = auth.login(attempt("tok", USERNAME, "wrong")).await;
        assert_eq!(auth.login_attempts(CLIENT).await, 1);

        clock.advance(ChronoDuration::minutes(10));
        assert_eq!(auth.prune_login_attempts().await, 0);

        clock.advance(ChronoDuration::minutes(6));
        assert_eq!(auth.prune_login_attempts().await, 1);
        assert_eq!(auth.login_attempts(CLIENT).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_runs_on_interval() {
        let (auth, clock) = authority();
        let _ = auth.create_session().await;
        let _ = auth.login(attempt("tok", USERNAME, "wrong")).await;
        auth.start();
        // Second start is a no-op.
        auth.start();

        clock.advance(ChronoDuration::hours(25));
        tokio::time::sleep(Duration::from_secs(15 * 60 + 1)).await;
        tokio::task::yield_now().await;

        assert_eq!(auth.active_sessions().await, 0);
        assert_eq!(auth.login_attempts(CLIENT).await, 0);
        auth.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_sweep_leaves_sessions_alone() {
        let (auth, clock) = authority();
        let _ = auth.create_session().await;
        auth.start();
        auth.stop();

        clock.advance(ChronoDuration::hours(25));
        tokio::time::sleep(Duration::from_secs(15 * 60 + 1)).await;

        assert_eq!(auth.active_sessions().await, 1);
    }
}
