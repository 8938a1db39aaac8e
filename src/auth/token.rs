//! Random token generation and constant-time comparison.

use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

use super::error::AuthError;

/// Session and CSRF tokens carry 256 bits of entropy.
pub const TOKEN_BYTES: usize = 32;

/// Source of random bytes for tokens.
pub trait TokenSource: Send + Sync {
    /// Fill `dest` with random bytes.
    ///
    /// # Errors
    /// Returns `AuthError::TokenGeneration` if the underlying source fails.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), AuthError>;
}

/// Operating system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsTokenSource;

impl TokenSource for OsTokenSource {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), AuthError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|err| AuthError::TokenGeneration(err.to_string()))
    }
}

/// Generate a hex-encoded 256-bit token.
///
/// # Errors
/// Returns `AuthError::TokenGeneration` if the source fails.
pub fn generate_token(source: &dyn TokenSource) -> Result<String, AuthError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    source.fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

/// Compare two secrets without leaking the length of their common prefix.
///
/// Inputs of different length are rejected before the constant-time path, so
/// only the length itself can be observed.
#[must_use]
pub fn constant_time_eq(left: &str, right: &str) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.as_bytes().ct_eq(right.as_bytes()).into()
}
