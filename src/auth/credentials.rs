//! The single admin credential and its bcrypt verification.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, instrument};

use super::error::AuthError;

/// Work factor used when hashing new passwords.
pub const DEFAULT_HASH_COST: u32 = 10;

// Modular crypt format: $2a$/$2b$/$2x$/$2y$, two-digit cost, 22-char salt + 31-char hash.
const BCRYPT_HASH_PATTERN: &str = r"^\$2[abxy]\$(0[4-9]|[12][0-9]|3[01])\$[./A-Za-z0-9]{53}$";

#[derive(Clone, Debug)]
pub struct Credentials {
    username: String,
    password_hash: SecretString,
}

impl Credentials {
    /// Build the credential from configuration.
    ///
    /// # Errors
    /// Returns `AuthError::Configuration` when the username is blank or the
    /// hash is not a bcrypt hash. A bad hash would otherwise fail every login
    /// at request time instead of at startup.
    pub fn new(username: String, password_hash: SecretString) -> Result<Self, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Configuration(
                "admin username must not be empty".to_string(),
            ));
        }

        if !valid_bcrypt_hash(password_hash.expose_secret()) {
            return Err(AuthError::Configuration(
                "admin password hash is not a valid bcrypt hash".to_string(),
            ));
        }

        Ok(Self {
            username,
            password_hash,
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check a submitted username and password.
    ///
    /// The username is compared with plain string equality and a mismatch
    /// returns before bcrypt runs. Hashing errors are logged and count as a
    /// failed login.
    #[instrument(skip_all)]
    pub async fn verify(&self, username: &str, password: &SecretString) -> bool {
        if username != self.username {
            return false;
        }

        let password = SecretString::from(password.expose_secret().to_owned());
        let hash = self.password_hash.clone();

        let result = tokio::task::spawn_blocking(move || {
            bcrypt::verify(password.expose_secret(), hash.expose_secret())
                .map_err(|err| AuthError::Verification(err.to_string()))
        })
        .await;

        match result {
            Ok(Ok(matches)) => matches,
            Ok(Err(err)) => {
                error!("Error validating password: {err}");
                false
            }
            Err(err) => {
                error!("Password verification task failed: {err}");
                false
            }
        }
    }
}

/// Hash a password for use as the configured credential.
///
/// # Errors
/// Returns `AuthError::Verification` if bcrypt rejects the cost or input.
pub fn hash_password(password: &SecretString, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password.expose_secret(), cost)
        .map_err(|err| AuthError::Verification(err.to_string()))
}

fn valid_bcrypt_hash(hash: &str) -> bool {
    Regex::new(BCRYPT_HASH_PATTERN).is_ok_and(|regex| regex.is_match(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost keeps the tests fast.
    const TEST_COST: u32 = 4;

    fn credentials(password: &str) -> Credentials {
        let hash = hash_password(&SecretString::from(password.to_string()), TEST_COST)
            .unwrap_or_default();
        Credentials::new("admin".to_string(), SecretString::from(hash))
            .unwrap_or_else(|err| panic!("test credentials: {err}"))
    }

    #[test]
    fn rejects_blank_username() {
        let hash = hash_password(&SecretString::from("pw".to_string()), TEST_COST)
            .unwrap_or_default();
        let result = Credentials::new("  ".to_string(), SecretString::from(hash));
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }

    #[test]
    fn rejects_malformed_hash() {
        for hash in ["", "password123", "$2b$10$short", "$1$abcdefgh$abcdefghijklmnopqrstuv"] {
            let result = Credentials::new("admin".to_string(), SecretString::from(hash.to_string()));
            assert!(
                matches!(result, Err(AuthError::Configuration(_))),
                "accepted {hash:?}"
            );
        }
    }

    #[test]
    fn accepts_generated_hash() {
        let hash = hash_password(&SecretString::from("secret".to_string()), DEFAULT_HASH_COST)
            .unwrap_or_default();
        assert!(hash.starts_with("$2b$10$"));
        assert!(valid_bcrypt_hash(&hash));
    }

    #[tokio::test]
    async fn verify_accepts_correct_password() {
        let credentials = credentials("correct horse");
        assert!(
            credentials
                .verify("admin", &SecretString::from("correct horse".to_string()))
                .await
        );
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let credentials = credentials("correct horse");
        assert!(
            !credentials
                .verify("admin", &SecretString::from("battery staple".to_string()))
                .await
        );
    }

    #[tokio::test]
    async fn verify_rejects_wrong_username() {
        let credentials = credentials("correct horse");
        assert!(
            !credentials
                .verify("root", &SecretString::from("correct horse".to_string()))
                .await
        );
    }
}
