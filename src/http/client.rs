use super::headers::{apply_standard_headers, set_bearer, set_client_tag};
use super::transport::{ApiRequest, ApiResponse, HttpTransport};
use super::url::{is_auth_url, resolve_url};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::navigation::{Navigator, Route};
use crate::redact::mask_token;
use crate::state::{LoadingTracker, SessionStore};
use crate::types::RefreshResponse;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const LOGIN_PATH: &str = "auth/login";
pub const REGISTER_PATH: &str = "auth/register";
pub const LOGOUT_PATH: &str = "auth/logout";
pub const REFRESH_PATH: &str = "auth/refresh";
pub const ME_PATH: &str = "auth/me";
pub const USERS_PATH: &str = "users";

type RefreshOutcome = Result<String, ApiError>;
type InFlightRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

struct ClientInner {
    config: AppConfig,
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    loading: LoadingTracker,
    navigator: Arc<dyn Navigator>,
    refresh: Mutex<Option<InFlightRefresh>>,
}

/// Every outbound API call goes through here: headers, the busy counter, and
/// transparent recovery from an expired access token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(
        config: AppConfig,
        transport: Arc<dyn HttpTransport>,
        session: SessionStore,
        loading: LoadingTracker,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                session,
                loading,
                navigator,
                refresh: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn loading(&self) -> &LoadingTracker {
        &self.inner.loading
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path)).await?.json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::post(path).with_body(to_body(body)?);
        self.execute(request).await?.json()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::put(path).with_body(to_body(body)?);
        self.execute(request).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Runs one call through the pipeline. An expired-token rejection triggers
    /// a single refresh and one replay; the replay is never refreshed again.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let prepared = self.prepare(request);
        let sent_token = prepared.bearer_token().map(str::to_string);

        match self.send_prepared(prepared.clone()).await {
            Err(err) if err.is_expired_session() => {
                debug!(url = %prepared.url, "Access token expired; refreshing session");
                let token = self.refreshed_access_token(sent_token.as_deref()).await?;
                let mut replay = prepared;
                set_bearer(&mut replay.headers, &token);
                let replay = self.prepare(replay);
                self.send_prepared(replay).await
            }
            other => other,
        }
    }

    fn prepare(&self, mut request: ApiRequest) -> ApiRequest {
        apply_standard_headers(&mut request.headers);

        if request.url.is_empty() {
            return request;
        }

        request.url = resolve_url(&self.inner.config.api_url, &request.url);

        if !is_auth_url(Some(&request.url)) {
            if let Some(token) = self.inner.session.access_token() {
                set_bearer(&mut request.headers, &token);
            }
        }

        if let Some(tag) = &self.inner.config.client_tag {
            set_client_tag(&mut request.headers, tag);
        }

        let token = request.bearer_token().map(mask_token);
        debug!(
            method = %request.method,
            url = %request.url,
            token = token.as_deref().unwrap_or("-"),
            "Sending API request"
        );
        request
    }

    async fn send_prepared(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let in_flight = self.inner.loading.begin();
        let result = self.inner.transport.send(request).await;
        drop(in_flight);

        let response = result?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(&response))
        }
    }

    async fn refreshed_access_token(&self, sent_token: Option<&str>) -> RefreshOutcome {
        // Another call already rotated the token this request was sent with.
        if let (Some(sent), Some(current)) = (sent_token, self.inner.session.access_token()) {
            if sent != current {
                debug!("Access token already refreshed; replaying with current token");
                return Ok(current);
            }
        }

        let refresh = {
            let mut slot = self.inner.refresh.lock();
            match slot.as_ref() {
                Some(in_flight) => in_flight.clone(),
                None => {
                    let client = self.clone();
                    let in_flight = async move {
                        let outcome = client.refresh_session().await;
                        client.inner.refresh.lock().take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(in_flight.clone());
                    in_flight
                }
            }
        };
        refresh.await
    }

    async fn refresh_session(&self) -> RefreshOutcome {
        let session = &self.inner.session;
        let generation = session.generation();

        let Some(refresh_token) = session.refresh_token() else {
            warn!("Session expired and no refresh token is stored");
            self.end_session();
            return Err(ApiError::NoRefreshToken);
        };

        match self.request_refresh(&refresh_token).await {
            Ok(tokens) => {
                let stored = session.replace_tokens_if(
                    generation,
                    &tokens.access_token,
                    tokens.refresh_token.as_deref(),
                );
                if stored {
                    info!(
                        rotated = tokens.refresh_token.is_some(),
                        "Session refreshed"
                    );
                    return Ok(tokens.access_token);
                }
                session.access_token().ok_or(ApiError::NoRefreshToken)
            }
            Err(err) => {
                // A login or logout landed mid-refresh; leave that session alone.
                if session.generation() != generation {
                    debug!(error = %err, "Refresh rejected after session changed; keeping newer session");
                    return session
                        .access_token()
                        .ok_or_else(|| ApiError::RefreshFailed(Arc::new(err)));
                }
                warn!(error = %err, "Session refresh rejected; signing out");
                self.end_session();
                Err(ApiError::RefreshFailed(Arc::new(err)))
            }
        }
    }

    /// Bypasses the pipeline: no counter, no bearer header, no retry.
    async fn request_refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let mut request = ApiRequest::post(resolve_url(&self.inner.config.api_url, REFRESH_PATH))
            .with_body(json!({ "refreshToken": refresh_token }));
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self.inner.transport.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        response.json()
    }

    fn end_session(&self) {
        self.inner.session.clear();
        self.inner.navigator.redirect(Route::Login);
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}
