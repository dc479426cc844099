mod app_state;
mod loading;
pub(crate) mod session_store;

pub use app_state::AppContext;
pub use loading::{InFlight, LoadingTracker};
pub use session_store::{SessionStore, KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_USER_DATA};
