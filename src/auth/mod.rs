//! Admin authentication: one configured credential, in-memory sessions,
//! double-submit CSRF tokens, and per-address login limiting.
//!
//! ## Sessions
//!
//! Session tokens are 256-bit random values, hex-encoded, carried in the
//! `session` cookie (`HttpOnly`, `SameSite=Strict`, `Secure` in production).
//! Sessions last 24 hours and every successful validation pushes the expiry
//! another 24 hours out. A background task sweeps expired entries every 15
//! minutes.
//!
//! ## Login
//!
//! A login submission is checked in a fixed order: CSRF token, rate limit,
//! field presence, credentials. Five attempts per address are allowed within
//! a 15-minute window; a successful login clears the counter.
//!
//! > **Warning:** All state lives in process memory. Restarting the process
//! > logs everyone out, and running more than one instance is not supported.

mod authority;
mod clock;
mod config;
pub mod cookies;
mod credentials;
mod csrf;
mod error;
mod rate_limit;
mod session;
mod token;

pub use authority::{IssuedToken, LoginAttempt, LoginOutcome, SessionAuthority};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use credentials::{hash_password, Credentials, DEFAULT_HASH_COST};
pub use csrf::CSRF_FORM_FIELD;
pub use error::AuthError;
pub use session::SessionCheck;
pub use token::{OsTokenSource, TokenSource, TOKEN_BYTES};
