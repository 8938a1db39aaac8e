//! # Menuboard
//!
//! Admin surface for a restaurant menu site. A single administrator signs in
//! with a username and a bcrypt password hash supplied through the
//! environment. Everything under `/admin` requires a valid session.
//!
//! The [`auth::SessionAuthority`] owns all authentication state in memory:
//! sliding-expiry sessions, per-client login throttling and double-submit
//! CSRF tokens. State does not survive a restart and is not shared between
//! processes.

pub mod auth;
pub mod cli;
pub mod menuboard;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
