//! Access/refresh token storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! The bearer interceptor, the refresh coordinator and login/logout are the
//! only callers. They depend on [`TokenStore`], never on the cookie jar, so the
//! medium can change per platform without touching them.

use std::sync::Arc;

use super::cookies::CookieStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub fn cookie_name(self) -> &'static str {
        match self {
            Self::Access => "accessToken",
            Self::Refresh => "refreshToken",
        }
    }
}

pub trait TokenStore: Send + Sync {
    /// Current token of `kind`. Empty values read as absent.
    fn get_token(&self, kind: TokenKind) -> Option<String>;
    fn set_token(&self, kind: TokenKind, value: &str);
    fn clear_token(&self, kind: TokenKind);

    fn clear_all(&self) {
        self.clear_token(TokenKind::Access);
        self.clear_token(TokenKind::Refresh);
    }
}

/// Tokens kept as `accessToken` / `refreshToken` cookies at path `/`.
#[derive(Clone)]
pub struct CookieTokenStore {
    cookies: Arc<dyn CookieStore>,
}

impl CookieTokenStore {
    #[must_use]
    pub fn new(cookies: Arc<dyn CookieStore>) -> Self {
        Self { cookies }
    }
}

impl TokenStore for CookieTokenStore {
    fn get_token(&self, kind: TokenKind) -> Option<String> {
        self.cookies.get(kind.cookie_name()).filter(|token| !token.is_empty())
    }

    fn set_token(&self, kind: TokenKind, value: &str) {
        if value.is_empty() {
            self.cookies.remove(kind.cookie_name());
        } else {
            self.cookies.set(kind.cookie_name(), value);
        }
    }

    fn clear_token(&self, kind: TokenKind) {
        self.cookies.remove(kind.cookie_name());
    }
}

#[cfg(test)]
#[path = "tokens_test.rs"]
mod tests;
