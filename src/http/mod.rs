//! HTTP client core: request/response types, transport, middleware chain.
//!
//! DESIGN
//! ======
//! A request flows through an explicit pipeline owned by [`ApiClient`]:
//! request interceptors in order, then the [`Transport`], then status
//! normalization, then response interceptors in order. The retry marker is
//! the `attempt` counter on [`Call`], not a flag hidden on the request.

pub mod client;
pub mod error;
pub mod interceptor;
pub mod transport;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

pub use client::{ApiClient, ApiClientBuilder, Dispatch};
pub use error::{ApiError, RefreshError};
pub use interceptor::{BearerInterceptor, RequestInterceptor, ResponseInterceptor};
pub use transport::{ReqwestTransport, Transport};

// =============================================================================
// REQUEST
// =============================================================================

/// One outgoing API call, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, headers: HeaderMap::new() }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set `Authorization: Bearer <token>`. Returns `false` and leaves the
    /// request untouched if `token` is not a valid header value.
    pub fn set_bearer(&mut self, token: &str) -> bool {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
                true
            }
            Err(_) => false,
        }
    }

    /// The bearer credential currently attached, if any.
    #[must_use]
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// A request travelling through the pipeline together with its retry count.
///
/// `attempt == 0` is the caller's original dispatch; anything higher is a
/// replay after a token refresh and must not trigger another refresh.
#[derive(Debug, Clone)]
pub struct Call {
    pub request: ApiRequest,
    pub attempt: u32,
}

impl Call {
    #[must_use]
    pub fn first(request: ApiRequest) -> Self {
        Self { request, attempt: 0 }
    }

    #[must_use]
    pub fn is_replay(&self) -> bool {
        self.attempt > 0
    }

    /// The next attempt of the same logical request.
    #[must_use]
    pub fn replay(&self) -> Self {
        Self { request: self.request.clone(), attempt: self.attempt + 1 }
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    /// A response carrying `value` serialized as JSON.
    #[must_use]
    pub fn json_body(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Turn any non-2xx response into [`ApiError::Status`].
    ///
    /// # Errors
    ///
    /// Returns the normalized status error for non-success responses.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.status.is_success() {
            return Ok(self);
        }
        let body = self.text();
        Err(ApiError::Status { status: self.status.as_u16(), message: status_message(self.status, &body), body })
    }
}

/// Prefer the backend's `message` field, falling back to the reason phrase.
fn status_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_owned())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
