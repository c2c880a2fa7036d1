//! Navigation seam used when the session cannot be recovered.

/// Route the user lands on after an unrecoverable auth failure.
pub const LOGIN_PATH: &str = "/login";

/// Full-page navigation. In a browser this assigns `window.location`; other
/// front ends decide what "go to the login page" means for them.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::warn!(%path, "navigation requested");
    }
}
