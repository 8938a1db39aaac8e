//! In-memory session store with a sliding expiry window.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Result of presenting a session token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCheck {
    /// Known and unexpired; the expiry has been pushed forward.
    Valid,
    /// No token was presented, or the token is unknown.
    Missing,
    /// Known but expired; the entry has been removed and the cookie should be cleared.
    Expired,
}

impl SessionCheck {
    #[must_use]
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// Token -> expiry map. Every read and write goes through one mutex, shared
/// with the background sweep.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, token: String, expires_at: DateTime<Utc>) {
        self.sessions.lock().await.insert(token, expires_at);
    }

    /// Validate a token and, when valid, slide its expiry to `now + ttl`.
    pub async fn touch(&self, token: &str, now: DateTime<Utc>, ttl: Duration) -> SessionCheck {
        let mut sessions = self.sessions.lock().await;
        let Some(expires_at) = sessions.get_mut(token) else {
            return SessionCheck::Missing;
        };

        if *expires_at <= now {
            sessions.remove(token);
            return SessionCheck::Expired;
        }

        *expires_at = now + ttl;
        SessionCheck::Valid
    }

    /// Remove a session. Returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.lock().await.remove(token).is_some()
    }

    /// Drop every session whose expiry is not after `now`. Returns how many were removed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, expires_at| *expires_at > now);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    #[cfg(test)]
    pub async fn expires_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.sessions.lock().await.get(token).copied()
    }
}
