//! Session: per-process composition root and the login/logout flows.
//!
//! DESIGN
//! ======
//! `SessionBuilder::build` is the one place the pipeline is assembled:
//! bearer interceptor first, refresh coordinator last. The resulting
//! `Session` holds the only [`AuthWriter`]; everything else gets an
//! [`AuthStore`] read handle.

use std::sync::Arc;

use super::refresh::RefreshCoordinator;
use super::state::{AuthStore, AuthWriter, UserProfile, auth_store};
use crate::api::{self, Credentials};
use crate::config::PortalConfig;
use crate::http::{ApiClient, ApiError, BearerInterceptor, ReqwestTransport, Transport};
use crate::navigate::{LogNavigator, Navigator};
use crate::store::{CookieStore, CookieTokenStore, LocalStorage, ProfileStore, SessionHint, TokenKind, TokenStore};

pub struct Session {
    pub(super) config: PortalConfig,
    pub(super) client: ApiClient,
    pub(super) cookies: Arc<dyn CookieStore>,
    pub(super) tokens: Arc<dyn TokenStore>,
    pub(super) hint: SessionHint,
    pub(super) writer: AuthWriter,
}

impl Session {
    #[must_use]
    pub fn builder(config: PortalConfig) -> SessionBuilder {
        SessionBuilder { config, cookies: None, storage: None, navigator: None, transport: None }
    }

    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// The shared client; feature code sends everything through it.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn auth(&self) -> AuthStore {
        self.writer.store()
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    #[must_use]
    pub fn hint(&self) -> &SessionHint {
        &self.hint
    }

    /// Exchange credentials for tokens, then load and publish the profile.
    ///
    /// # Errors
    ///
    /// Returns the login or profile request error. On a profile failure the
    /// freshly stored tokens are discarded so no half-logged-in state remains.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, ApiError> {
        let pair = api::login(&self.client, &self.config.endpoints, credentials).await?;
        self.tokens.set_token(TokenKind::Access, &pair.access_token);
        match pair.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            Some(refresh) => self.tokens.set_token(TokenKind::Refresh, refresh),
            None => self.tokens.clear_token(TokenKind::Refresh),
        }

        let user = match api::members_info(&self.client, &self.config.endpoints).await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!(error = %err, "profile fetch after login failed");
                self.tokens.clear_all();
                return Err(err);
            }
        };

        self.writer.set_user(user.clone());
        self.hint.mark();
        tracing::info!(nickname = user.nickname().unwrap_or_default(), "logged in");
        Ok(user)
    }

    /// End the session locally, telling the server on a best-effort basis.
    pub async fn logout(&self) {
        if let Err(err) = api::logout(&self.client, &self.config.endpoints).await {
            tracing::warn!(error = %err, status = ?err.status(), "server logout failed; clearing local session anyway");
        }
        self.tokens.clear_all();
        self.hint.clear();
        self.writer.reset_user();
        tracing::info!("logged out");
    }
}

// =============================================================================
// BUILDER
// =============================================================================

pub struct SessionBuilder {
    config: PortalConfig,
    cookies: Option<Arc<dyn CookieStore>>,
    storage: Option<Arc<dyn LocalStorage>>,
    navigator: Option<Arc<dyn Navigator>>,
    transport: Option<Arc<dyn Transport>>,
}

impl SessionBuilder {
    /// Use `profile` as both the cookie jar and the local storage.
    #[must_use]
    pub fn profile(mut self, profile: Arc<ProfileStore>) -> Self {
        self.cookies = Some(profile.clone());
        self.storage = Some(profile);
        self
    }

    #[must_use]
    pub fn cookies(mut self, cookies: Arc<dyn CookieStore>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn LocalStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the default `reqwest` transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Assemble the pipeline. Missing stores default to one shared in-memory
    /// profile; a missing navigator only logs.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP transport fails to build.
    pub fn build(self) -> Result<Session, ApiError> {
        let fallback = Arc::new(ProfileStore::in_memory());
        let cookies: Arc<dyn CookieStore> = match self.cookies {
            Some(cookies) => cookies,
            None => fallback.clone(),
        };
        let storage: Arc<dyn LocalStorage> = match self.storage {
            Some(storage) => storage,
            None => fallback,
        };
        let navigator: Arc<dyn Navigator> = match self.navigator {
            Some(navigator) => navigator,
            None => Arc::new(LogNavigator),
        };
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config, cookies.clone())?),
        };

        let tokens: Arc<dyn TokenStore> = Arc::new(CookieTokenStore::new(cookies.clone()));
        let endpoints = &self.config.endpoints;
        let coordinator = RefreshCoordinator::new(transport.clone(), tokens.clone(), navigator, &endpoints.reissue)
            .with_coalescing(self.config.coalesce_refresh)
            .exempt(&endpoints.login)
            .exempt(&endpoints.logout);

        let client = ApiClient::builder(transport)
            .request_interceptor(Arc::new(BearerInterceptor::new(tokens.clone())))
            .response_interceptor(Arc::new(coordinator))
            .build();

        let (_, writer) = auth_store();
        Ok(Session { config: self.config, client, cookies, tokens, hint: SessionHint::new(storage), writer })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
