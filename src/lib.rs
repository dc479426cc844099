pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod navigation;
mod redact;
pub mod services;
pub mod state;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{ApiError, ConfigError, TransportError};
pub use events::{EventDispatcher, EventHub, LogToastSink, Subscription, ToastSink};
pub use http::{ApiClient, HttpTransport, ReqwestTransport};
pub use navigation::{LogNavigator, Navigator, Route};
pub use redact::{mask_token, redact_secrets};
pub use services::{AuthService, UserService};
pub use state::{AppContext, LoadingTracker, SessionStore};
pub use storage::{FileStore, JsonStoreExt, KeyValueStore, MemoryStore};
