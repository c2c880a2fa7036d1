//! Refresh coordinator: one-shot recovery from an expired access token.
//!
//! DESIGN
//! ======
//! Installed as the last response interceptor. For each logical request:
//!
//! ```text
//! NORMAL ── 401, attempt 0 ──▶ REFRESHING ── new token ──▶ REPLAY ──▶ outcome
//!                                   │
//!                                   └── no refresh token / reissue failed ──▶ TERMINAL
//! ```
//!
//! Replays carry `attempt == 1`, so a 401 on the replay falls through the
//! NORMAL arm and reaches the caller: at most one reissue per request.
//!
//! The reissue call goes straight to the transport, bypassing interceptors,
//! so its own 401 is a terminal failure rather than a nested refresh.
//!
//! CONCURRENCY
//! ===========
//! With coalescing on, requests that hit 401 while a reissue is in flight
//! await the same shared future instead of starting their own. Terminal side
//! effects (clearing tokens, navigating to login) live inside that future and
//! run once per reissue. With coalescing off every request reissues
//! independently and the last token written wins.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::api;
use crate::http::{ApiError, ApiResponse, Call, Dispatch, RefreshError, ResponseInterceptor, Transport};
use crate::navigate::{LOGIN_PATH, Navigator};
use crate::store::{TokenKind, TokenStore};

type RefreshFuture = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

#[derive(Default)]
struct InFlight {
    generation: u64,
    current: Option<(u64, RefreshFuture)>,
}

pub struct RefreshCoordinator {
    reissue: Arc<Reissuer>,
    coalesce: bool,
    exempt: HashSet<String>,
    in_flight: Mutex<InFlight>,
}

/// Everything a reissue needs, owned so the shared future can be `'static`.
struct Reissuer {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    path: String,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        reissue_path: &str,
    ) -> Self {
        let reissue = Reissuer { transport, tokens, navigator, path: reissue_path.to_owned() };
        Self { reissue: Arc::new(reissue), coalesce: true, exempt: HashSet::new(), in_flight: Mutex::default() }
    }

    #[must_use]
    pub fn with_coalescing(mut self, coalesce: bool) -> Self {
        self.coalesce = coalesce;
        self
    }

    /// Let 401s on `path` reach the caller untouched (e.g. the login call,
    /// where 401 means bad credentials, not an expired token).
    #[must_use]
    pub fn exempt(mut self, path: &str) -> Self {
        self.exempt.insert(path.to_owned());
        self
    }

    fn lock(&self) -> MutexGuard<'_, InFlight> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Obtain a fresh access token, sharing an in-flight reissue if allowed.
    async fn refresh(&self) -> Result<String, RefreshError> {
        if !self.coalesce {
            return self.reissue.clone().run().await;
        }

        let (generation, shared) = {
            let mut in_flight = self.lock();
            let joined = in_flight.current.as_ref().map(|(generation, shared)| (*generation, shared.clone()));
            match joined {
                Some((generation, shared)) => {
                    tracing::debug!(generation, "joining in-flight token reissue");
                    (generation, shared)
                }
                None => {
                    in_flight.generation += 1;
                    let generation = in_flight.generation;
                    let shared = self.reissue.clone().run().boxed().shared();
                    in_flight.current = Some((generation, shared.clone()));
                    (generation, shared)
                }
            }
        };

        let result = shared.await;

        let mut in_flight = self.lock();
        if in_flight.current.as_ref().is_some_and(|(current, _)| *current == generation) {
            in_flight.current = None;
        }
        result
    }
}

impl Reissuer {
    async fn run(self: Arc<Self>) -> Result<String, RefreshError> {
        let Some(refresh_token) = self.tokens.get_token(TokenKind::Refresh) else {
            tracing::info!("access token expired and no refresh token is stored");
            self.terminate();
            return Err(RefreshError::MissingRefreshToken);
        };

        match self.exchange(&refresh_token).await {
            Ok(pair) => {
                self.tokens.set_token(TokenKind::Access, &pair.access_token);
                if let Some(rotated) = pair.refresh_token.as_deref().filter(|t| !t.is_empty()) {
                    self.tokens.set_token(TokenKind::Refresh, rotated);
                }
                tracing::debug!("access token reissued");
                Ok(pair.access_token)
            }
            Err(err) => {
                tracing::warn!(error = %err, status = ?err.status(), "token reissue failed");
                self.terminate();
                Err(RefreshError::Reissue(Box::new(err)))
            }
        }
    }

    async fn exchange(&self, refresh_token: &str) -> Result<api::TokenPair, ApiError> {
        let request = api::reissue_request(&self.path, refresh_token)?;
        let response = self.transport.send(&request).await?.error_for_status()?;
        api::parse_token_pair(&response)
    }

    fn terminate(&self) {
        self.tokens.clear_all();
        self.navigator.navigate(LOGIN_PATH);
    }
}

#[async_trait::async_trait]
impl ResponseInterceptor for RefreshCoordinator {
    async fn on_response(
        &self,
        outcome: Result<ApiResponse, ApiError>,
        call: &Call,
        dispatch: &dyn Dispatch,
    ) -> Result<ApiResponse, ApiError> {
        match outcome {
            Err(err) if err.is_unauthorized() && !call.is_replay() && !self.exempt.contains(&call.request.path) => {
                tracing::debug!(path = %call.request.path, "401 received; refreshing access token");
                let token = self.refresh().await?;

                let mut replay = call.replay();
                replay.request.set_bearer(&token);
                dispatch.dispatch(replay).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
