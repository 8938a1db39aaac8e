//! Login attempt limiting keyed by client address.
//!
//! Each address gets a fixed budget of attempts. The counter resets once the
//! last attempt is older than the window, and a successful login deletes the
//! entry outright.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_WINDOW_SECONDS: i64 = 15 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AttemptEntry {
    count: u32,
    last_attempt: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LoginRateLimiter {
    max_attempts: u32,
    window: Duration,
    attempts: Mutex<HashMap<String, AttemptEntry>>,
}

impl LoginRateLimiter {
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Register an attempt from `client`, or refuse it when the budget is spent.
    ///
    /// A refused attempt does not move the timestamp, so the window keeps
    /// counting from the last accepted attempt.
    pub async fn check_and_register(&self, client: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let mut attempts = self.attempts.lock().await;
        let entry = attempts.entry(client.to_string()).or_insert(AttemptEntry {
            count: 0,
            last_attempt: now,
        });

        if now - entry.last_attempt > self.window {
            entry.count = 0;
        }

        if entry.count >= self.max_attempts {
            return RateLimitDecision::Limited;
        }

        entry.count += 1;
        entry.last_attempt = now;
        RateLimitDecision::Allowed
    }

    /// Forget every attempt from `client`.
    pub async fn reset(&self, client: &str) {
        self.attempts.lock().await.remove(client);
    }

    /// Drop entries whose last attempt is outside the window. Returns how many were removed.
    pub async fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut attempts = self.attempts.lock().await;
        let before = attempts.len();
        attempts.retain(|_, entry| now - entry.last_attempt <= self.window);
        before - attempts.len()
    }

    /// Attempts currently recorded for `client`, ignoring window expiry.
    pub async fn attempts(&self, client: &str) -> u32 {
        self.attempts
            .lock()
            .await
            .get(client)
            .map_or(0, |entry| entry.count)
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::seconds(DEFAULT_WINDOW_SECONDS),
        )
    }
}
