//! Client-side persistence: cookie jar, durable local storage, auth tokens.
//!
//! SYSTEM CONTEXT
//! ==============
//! `profile` owns the bytes (in memory or a JSON file standing in for a
//! browser profile), `cookies` and `local` expose the browser-shaped views of
//! it, and `tokens` is the only way the auth core touches token cookies.

pub mod cookies;
pub mod local;
pub mod profile;
pub mod tokens;

use std::path::PathBuf;

pub use cookies::{CookieJar, CookieStore};
pub use local::{LocalStorage, SESSION_HINT_KEY, SessionHint};
pub use profile::ProfileStore;
pub use tokens::{CookieTokenStore, TokenKind, TokenStore};

/// Errors produced when opening or persisting a profile file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("profile io failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
