use super::{LoadingTracker, SessionStore};
use crate::config::AppConfig;
use crate::error::TransportError;
use crate::events::EventHub;
use crate::http::{ApiClient, HttpTransport, ReqwestTransport};
use crate::navigation::Navigator;
use crate::services::{AuthService, OperationTracker, UserService};
use crate::storage::KeyValueStore;
use std::sync::Arc;

/// Everything a front end needs, built once and cloned freely. Each clone
/// shares the same session, counter, hub and in-flight refresh.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Arc<dyn KeyValueStore>,
    pub session: SessionStore,
    pub loading: LoadingTracker,
    pub events: EventHub,
    pub client: ApiClient,
    pub auth: AuthService,
    pub users: UserService,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = SessionStore::new(storage.clone());
        let loading = LoadingTracker::new();
        let events = EventHub::new();
        let client = ApiClient::new(
            config,
            transport,
            session.clone(),
            loading.clone(),
            navigator,
        );
        let tracker = OperationTracker::new(events.clone());

        Self {
            storage,
            session,
            loading,
            events,
            auth: AuthService::new(client.clone(), tracker.clone()),
            users: UserService::new(client.clone(), tracker),
            client,
        }
    }

    /// Same as [`AppContext::new`] over a real HTTP client using the
    /// configured timeout.
    pub fn with_reqwest(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        Ok(Self::new(config, storage, transport, navigator))
    }

    pub fn config(&self) -> &AppConfig {
        self.client.config()
    }
}
