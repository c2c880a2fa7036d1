//! Session bootstrap: decide the initial auth state at startup.
//!
//! Anonymous visitors (no session hint, no CSRF cookie) never pay for a
//! network round trip. Everyone else gets one session check through the normal
//! pipeline, so an expired access token is refreshed before the check fails.

use super::session::Session;
use super::state::UserProfile;
use crate::api;
use crate::http::ApiError;

/// What [`Session::init_auth`] concluded. The auth state already reflects it.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// No local signal of a previous session; no request was made.
    Skipped,
    /// The server recognized the session.
    Restored(UserProfile),
    /// The server answered without a user.
    Empty,
    /// The session check failed. `status` is the failing HTTP status, including
    /// one from a failed token reissue. `unexpected` marks any status other
    /// than the "no session" 400.
    Rejected { status: Option<u16>, unexpected: bool },
}

fn should_attempt_restore(hinted: bool, has_session_cookie: bool) -> bool {
    hinted || has_session_cookie
}

fn is_unexpected(err: &ApiError) -> bool {
    err.cause_status().is_some_and(|status| status != 400)
}

impl Session {
    /// Restore the auth state at startup. Never fails and may be re-run.
    pub async fn init_auth(&self) -> BootstrapOutcome {
        let hinted = self.hint.is_set();
        let has_session_cookie = self.cookies.contains(&self.config.csrf_cookie);

        if !should_attempt_restore(hinted, has_session_cookie) {
            tracing::debug!("no session signals; starting logged out");
            self.writer.reset_user();
            return BootstrapOutcome::Skipped;
        }

        match api::try_session(&self.client, &self.config.endpoints).await {
            Ok(Some(user)) => {
                self.writer.set_user(user.clone());
                self.hint.mark();
                tracing::debug!("session restored");
                BootstrapOutcome::Restored(user)
            }
            Ok(None) => {
                self.teardown();
                BootstrapOutcome::Empty
            }
            Err(err) => {
                let unexpected = is_unexpected(&err);
                if unexpected {
                    tracing::error!(error = %err, status = ?err.cause_status(), "session restore failed");
                } else {
                    tracing::debug!(error = %err, "no session to restore");
                }
                self.teardown();
                BootstrapOutcome::Rejected { status: err.cause_status(), unexpected }
            }
        }
    }

    fn teardown(&self) {
        self.writer.reset_user();
        self.hint.clear();
    }
}

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod tests;
