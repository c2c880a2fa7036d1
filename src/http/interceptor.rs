//! Middleware seams of the request pipeline, plus the bearer-token injector.

use std::sync::Arc;

use super::client::Dispatch;
use super::{ApiError, ApiRequest, ApiResponse, Call};
use crate::store::{TokenKind, TokenStore};

/// Synchronous, infallible rewrite of an outgoing request.
pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: ApiRequest) -> ApiRequest;
}

/// Post-processing of a completed dispatch.
///
/// `dispatch` re-enters the full pipeline, so an interceptor can replay
/// `call` (with a bumped attempt) and return that outcome instead.
#[async_trait::async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_response(
        &self,
        outcome: Result<ApiResponse, ApiError>,
        call: &Call,
        dispatch: &dyn Dispatch,
    ) -> Result<ApiResponse, ApiError>;
}

// =============================================================================
// BEARER
// =============================================================================

/// Attaches `Authorization: Bearer <accessToken>` when a token is stored.
pub struct BearerInterceptor {
    tokens: Arc<dyn TokenStore>,
}

impl BearerInterceptor {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

impl RequestInterceptor for BearerInterceptor {
    fn on_request(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(token) = self.tokens.get_token(TokenKind::Access) {
            if !request.set_bearer(&token) {
                tracing::warn!(path = %request.path, "stored access token is not a valid header value; sending unauthenticated");
            }
        }
        request
    }
}

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod tests;
