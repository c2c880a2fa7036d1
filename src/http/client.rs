//! `ApiClient`: the shared request executor every feature goes through.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::interceptor::{RequestInterceptor, ResponseInterceptor};
use super::transport::Transport;
use super::{ApiError, ApiRequest, ApiResponse, Call};

/// Runs a [`Call`] through the whole pipeline.
#[async_trait::async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, call: Call) -> Result<ApiResponse, ApiError>;
}

struct Pipeline {
    transport: Arc<dyn Transport>,
    request_chain: Vec<Arc<dyn RequestInterceptor>>,
    response_chain: Vec<Arc<dyn ResponseInterceptor>>,
}

#[async_trait::async_trait]
impl Dispatch for Pipeline {
    async fn dispatch(&self, call: Call) -> Result<ApiResponse, ApiError> {
        let request = self
            .request_chain
            .iter()
            .fold(call.request.clone(), |request, interceptor| interceptor.on_request(request));

        let mut outcome = self
            .transport
            .send(&request)
            .await
            .and_then(ApiResponse::error_for_status);

        if let Err(err) = &outcome {
            tracing::debug!(path = %request.path, attempt = call.attempt, status = ?err.status(), "api call failed");
        }

        for interceptor in &self.response_chain {
            outcome = interceptor.on_response(outcome, &call, self).await;
        }
        outcome
    }
}

/// Cheap to clone; clones share one transport and interceptor chain.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<Pipeline>,
}

impl ApiClient {
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>) -> ApiClientBuilder {
        ApiClientBuilder { transport, request_chain: Vec::new(), response_chain: Vec::new() }
    }

    /// Issue `method path` with an optional JSON body and extra headers.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError`] for transport failures, non-2xx
    /// statuses that no interceptor recovered, or an exhausted refresh.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        if let Some(headers) = headers {
            request = request.with_headers(headers);
        }
        self.send(request).await
    }

    /// Dispatch a prepared request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.pipeline.dispatch(Call::first(request)).await
    }

    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::Decode`] on shape mismatch.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// `POST path` with `body` as JSON and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::Decode`] on shape mismatch.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.send(ApiRequest::post(path).with_body(body)).await?.json()
    }
}

pub struct ApiClientBuilder {
    transport: Arc<dyn Transport>,
    request_chain: Vec<Arc<dyn RequestInterceptor>>,
    response_chain: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    /// Append to the request chain; interceptors run in insertion order.
    #[must_use]
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_chain.push(interceptor);
        self
    }

    /// Append to the response chain; interceptors run in insertion order.
    #[must_use]
    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_chain.push(interceptor);
        self
    }

    #[must_use]
    pub fn build(self) -> ApiClient {
        ApiClient {
            pipeline: Arc::new(Pipeline {
                transport: self.transport,
                request_chain: self.request_chain,
                response_chain: self.response_chain,
            }),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
