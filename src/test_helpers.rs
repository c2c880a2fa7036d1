//! Shared mocks for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::http::{ApiError, ApiRequest, ApiResponse, Transport};
use crate::navigate::Navigator;

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync>;

/// Transport answering from a closure and recording every request it sees.
pub struct ScriptedTransport {
    handler: Handler,
    delays: HashMap<String, Duration>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(handler: impl Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static) -> Self {
        Self { handler: Box::new(handler), delays: HashMap::new(), sent: Mutex::new(Vec::new()) }
    }

    /// Hold responses for `path` for `delay` before answering.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_owned(), delay);
        self
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, path: &str) -> Vec<ApiRequest> {
        self.sent().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.sent_to(path).len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delays.get(&request.path) {
            tokio::time::sleep(*delay).await;
        }
        (self.handler)(request)
    }
}

/// Navigator that remembers where it was sent.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_owned());
    }
}

pub fn ok_json(value: &Value) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::json_body(StatusCode::OK, value))
}

pub fn status(code: u16) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::new(StatusCode::from_u16(code).unwrap(), ""))
}
