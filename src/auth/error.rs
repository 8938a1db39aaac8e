use thiserror::Error;

/// Internal failures of the auth layer.
///
/// Rejected logins and missing sessions are outcomes, not errors; see
/// `LoginOutcome` and `SessionCheck`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed credential configuration. Fatal at startup.
    #[error("invalid auth configuration: {0}")]
    Configuration(String),
    /// The password hashing library failed. Treated as a failed login.
    #[error("password verification failed: {0}")]
    Verification(String),
    /// The random source could not produce a token.
    #[error("failed to generate token: {0}")]
    TokenGeneration(String),
    /// A token could not be encoded as a `Set-Cookie` header.
    #[error("invalid cookie: {0}")]
    InvalidCookie(String),
}
