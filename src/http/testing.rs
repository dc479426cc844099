use super::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::error::{TransportError, EXPIRED_TOKEN_MESSAGE};
use crate::navigation::{Navigator, Route};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type Handler = Arc<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;

pub fn json_response(status: StatusCode, body: Value) -> ApiResponse {
    ApiResponse::json_body(status, &body)
}

pub fn expired() -> ApiResponse {
    json_response(
        StatusCode::UNAUTHORIZED,
        json!({ "message": EXPIRED_TOKEN_MESSAGE }),
    )
}

/// Scripted transport keyed by `(method, absolute url)`. Unrouted calls get a
/// 404 with a JSON message.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Handler>>,
    delays: Mutex<HashMap<(Method, String), Duration>>,
    failure: Mutex<Option<TransportError>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(&self, method: Method, url: &str, handler: F)
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .insert((method, url.to_string()), Arc::new(handler));
    }

    pub fn delay(&self, method: Method, url: &str, delay: Duration) {
        self.delays.lock().insert((method, url.to_string()), delay);
    }

    pub fn fail_with(&self, err: TransportError) {
        *self.failure.lock() = Some(err);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn hits(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }

        let key = (request.method.clone(), request.url.clone());
        let delay = self.delays.lock().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let handler = self.routes.lock().get(&key).cloned();
        Ok(match handler {
            Some(handler) => handler(&request),
            None => json_response(StatusCode::NOT_FOUND, json!({ "message": "no route" })),
        })
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: Route) {
        self.routes.lock().push(route);
    }
}
