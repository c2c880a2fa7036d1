//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by any UI consumer; written only through [`AuthWriter`], which the
//! [`super::Session`] owns. Bootstrap and explicit login/logout are therefore
//! the only code paths that can change who the UI thinks is logged in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;

// =============================================================================
// USER PROFILE
// =============================================================================

/// Server-owned user record, kept as the raw JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    #[must_use]
    pub fn nickname(&self) -> Option<&str> {
        self.str_field("nickname")
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.str_field("role")
    }

    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.str_field("department")
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

// =============================================================================
// AUTH STATE
// =============================================================================

/// `is_logged_in` is never true without a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    is_logged_in: bool,
    user: Option<UserProfile>,
}

impl AuthState {
    #[must_use]
    pub fn logged_out() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }
}

/// Create the process's auth state: one read handle, one writer.
#[must_use]
pub fn auth_store() -> (AuthStore, AuthWriter) {
    let (tx, rx) = watch::channel(AuthState::logged_out());
    (AuthStore { rx }, AuthWriter { tx })
}

/// Read-only, cloneable view of the auth state.
#[derive(Clone, Debug)]
pub struct AuthStore {
    rx: watch::Receiver<AuthState>,
}

impl AuthStore {
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.rx.borrow().is_logged_in
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.rx.borrow().user.clone()
    }

    /// Watch for changes; the receiver sees the latest state on each change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.rx.clone()
    }
}

/// The single writer of [`AuthState`]; not `Clone`.
#[derive(Debug)]
pub struct AuthWriter {
    tx: watch::Sender<AuthState>,
}

impl AuthWriter {
    /// Log in as `user`.
    pub fn set_user(&self, user: UserProfile) {
        self.tx.send_modify(|state| {
            state.user = Some(user);
            state.is_logged_in = true;
        });
    }

    /// Flip the logged-in flag. Turning it on without a user is refused and
    /// returns `false`; turning it off also drops the user.
    pub fn set_logged_in(&self, logged_in: bool) -> bool {
        if !logged_in {
            self.reset_user();
            return true;
        }
        self.tx.send_if_modified(|state| {
            if state.user.is_some() && !state.is_logged_in {
                state.is_logged_in = true;
                true
            } else {
                false
            }
        });
        let applied = self.tx.borrow().is_logged_in;
        if !applied {
            tracing::warn!("refusing to mark logged in without a user");
        }
        applied
    }

    /// Back to logged out.
    pub fn reset_user(&self) {
        self.tx.send_if_modified(|state| {
            if *state == AuthState::logged_out() {
                false
            } else {
                *state = AuthState::logged_out();
                true
            }
        });
    }

    #[must_use]
    pub fn store(&self) -> AuthStore {
        AuthStore { rx: self.tx.subscribe() }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
