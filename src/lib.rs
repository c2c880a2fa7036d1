//! Portal: authenticated REST client core for the campus community portal.
//!
//! SYSTEM CONTEXT
//! ==============
//! Feature code (boards, comments, menus, news, calendar) issues every request
//! through one shared [`http::ApiClient`]. The client runs an explicit
//! middleware chain: the bearer interceptor attaches the access token, and the
//! refresh coordinator recovers once from an expired token before giving up and
//! sending the user to the login page. [`auth::Session`] wires the pieces
//! together and owns the only writer of the process-wide auth state.

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod navigate;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use auth::{AuthState, AuthStore, BootstrapOutcome, Credentials, Session, SessionBuilder, UserProfile};
pub use config::{ConfigError, Endpoints, PortalConfig};
pub use http::{ApiClient, ApiError, ApiRequest, ApiResponse, RefreshError};
pub use navigate::{LOGIN_PATH, LogNavigator, Navigator};
pub use store::{CookieStore, LocalStorage, ProfileStore, SessionHint, StoreError, TokenKind, TokenStore};
