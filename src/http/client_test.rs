use super::*;
use crate::test_helpers::{ScriptedTransport, ok_json, status};
use reqwest::header::HeaderValue;
use serde_json::json;
use std::sync::Mutex;

struct Tag(&'static str);

impl RequestInterceptor for Tag {
    fn on_request(&self, mut request: ApiRequest) -> ApiRequest {
        let trail = request
            .headers
            .get("x-trail")
            .and_then(|v| v.to_str().ok())
            .map(|v| format!("{v},{}", self.0))
            .unwrap_or_else(|| self.0.to_owned());
        request.headers.insert("x-trail", HeaderValue::from_str(&trail).unwrap());
        request
    }
}

#[derive(Default)]
struct Observer {
    seen: Mutex<Vec<(u32, Option<u16>)>>,
}

#[async_trait::async_trait]
impl ResponseInterceptor for Observer {
    async fn on_response(
        &self,
        outcome: Result<ApiResponse, ApiError>,
        call: &Call,
        _dispatch: &dyn Dispatch,
    ) -> Result<ApiResponse, ApiError> {
        let status = match &outcome {
            Ok(resp) => Some(resp.status.as_u16()),
            Err(err) => err.status(),
        };
        self.seen.lock().unwrap().push((call.attempt, status));
        outcome
    }
}

#[tokio::test]
async fn request_chain_runs_in_insertion_order() {
    let transport = Arc::new(ScriptedTransport::new(|_| ok_json(&json!({}))));
    let client = ApiClient::builder(transport.clone())
        .request_interceptor(Arc::new(Tag("first")))
        .request_interceptor(Arc::new(Tag("second")))
        .build();

    client.send(ApiRequest::get("/boards")).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].headers.get("x-trail").unwrap(), "first,second");
}

#[tokio::test]
async fn non_success_status_is_normalized() {
    let transport = Arc::new(ScriptedTransport::new(|_| status(503)));
    let client = ApiClient::builder(transport).build();

    let err = client.send(ApiRequest::get("/menus")).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn response_chain_sees_first_attempt_and_status() {
    let observer = Arc::new(Observer::default());
    let transport = Arc::new(ScriptedTransport::new(|_| status(404)));
    let client = ApiClient::builder(transport).response_interceptor(observer.clone()).build();

    let _ = client.send(ApiRequest::get("/news/1")).await;
    assert_eq!(*observer.seen.lock().unwrap(), vec![(0, Some(404))]);
}

#[tokio::test]
async fn request_passes_body_and_headers() {
    let transport = Arc::new(ScriptedTransport::new(|_| ok_json(&json!({ "id": 7 }))));
    let client = ApiClient::builder(transport.clone()).build();

    let mut headers = HeaderMap::new();
    headers.insert("x-board", HeaderValue::from_static("free"));
    let resp = client
        .request(Method::POST, "/boards/free/posts", Some(json!({ "title": "hi" })), Some(headers))
        .await
        .unwrap();

    assert_eq!(resp.json::<serde_json::Value>().unwrap()["id"], 7);
    let sent = &transport.sent()[0];
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.body, Some(json!({ "title": "hi" })));
    assert_eq!(sent.headers.get("x-board").unwrap(), "free");
}

#[tokio::test]
async fn json_helpers_decode_and_report_shape_mismatch() {
    #[derive(Debug, serde::Deserialize)]
    struct Menu {
        date: String,
    }

    let transport = Arc::new(ScriptedTransport::new(|req| match req.path.as_str() {
        "/menus/today" => ok_json(&json!({ "date": "2026-10-14" })),
        _ => ok_json(&json!([1, 2, 3])),
    }));
    let client = ApiClient::builder(transport).build();

    let menu: Menu = client.get_json("/menus/today").await.unwrap();
    assert_eq!(menu.date, "2026-10-14");

    let err = client.post_json::<_, Menu>("/menus/search", &json!({ "q": "rice" })).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
