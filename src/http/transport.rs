//! Transport: the single place requests leave the process.
//!
//! Thin `reqwest` wrapper: fixed base URL, JSON default headers, bounded
//! timeout, and the profile's cookie jar. Any HTTP status is a successful
//! send; status interpretation belongs to the pipeline.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

use super::{ApiError, ApiRequest, ApiResponse};
use crate::config::PortalConfig;
use crate::store::{CookieJar, CookieStore};

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Timeout`] or [`ApiError::Network`] when no response
    /// arrives.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Build the shared client for `config`, storing cookies in `cookies`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &PortalConfig, cookies: Arc<dyn CookieStore>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .cookie_provider(Arc::new(CookieJar::new(cookies)))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url.clone(), timeout: config.request_timeout })
    }

    fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url).headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(&e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.classify(&e))?;

        tracing::debug!(method = %request.method, path = %request.path, status = status.as_u16(), "api response");
        Ok(ApiResponse { status, headers, body: body.to_vec() })
    }
}

impl ReqwestTransport {
    fn classify(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
