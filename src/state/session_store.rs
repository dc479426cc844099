use crate::storage::{JsonStoreExt, KeyValueStore};
use crate::types::{CredentialPair, User};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

pub const KEY_ACCESS_TOKEN: &str = "access-token";
pub const KEY_REFRESH_TOKEN: &str = "refresh-token";
pub const KEY_USER_DATA: &str = "user-data";

#[derive(Default)]
struct SessionState {
    user: Option<User>,
    generation: u64,
}

/// Signed-in session: tokens live in the key/value store, the user profile is
/// cached in memory and mirrored to the store.
///
/// Every credential write bumps `generation`, which lets a slow token refresh
/// detect that a login or logout happened while it was in flight.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let user = storage.get_json::<User>(KEY_USER_DATA);
        Self {
            storage,
            state: Arc::new(Mutex::new(SessionState {
                user,
                generation: 0,
            })),
        }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn user(&self) -> Option<User> {
        self.state.lock().user.clone()
    }

    pub fn update_user(&self, user: Option<User>) {
        let mut state = self.state.lock();
        match &user {
            Some(user) => self.storage.set_json(KEY_USER_DATA, user),
            None => self.storage.remove(KEY_USER_DATA),
        }
        state.user = user;
    }

    pub fn clear_user(&self) {
        self.update_user(None);
    }

    /// Back to the initial state. The handle and its clones stay usable.
    pub fn reset(&self) {
        self.clear_user();
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_token(KEY_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_token(KEY_REFRESH_TOKEN)
    }

    fn read_token(&self, key: &str) -> Option<String> {
        self.storage.get(key).filter(|t| !t.trim().is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn set_tokens(&self, credentials: &CredentialPair) {
        let mut state = self.state.lock();
        state.generation += 1;
        self.storage.set(KEY_ACCESS_TOKEN, &credentials.access_token);
        self.storage.set(KEY_REFRESH_TOKEN, &credentials.refresh_token);
    }

    /// Stores refreshed tokens only if no other credential write happened
    /// since `generation` was read. Returns whether the tokens were stored.
    pub fn replace_tokens_if(
        &self,
        generation: u64,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(
                expected = generation,
                actual = state.generation,
                "Session changed during refresh; keeping newer credentials"
            );
            return false;
        }
        state.generation += 1;
        self.storage.set(KEY_ACCESS_TOKEN, access_token);
        if let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) {
            self.storage.set(KEY_REFRESH_TOKEN, refresh_token);
        }
        true
    }

    /// Drops tokens and the cached user.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        self.storage.remove(KEY_ACCESS_TOKEN);
        self.storage.remove(KEY_REFRESH_TOKEN);
        self.storage.remove(KEY_USER_DATA);
        state.user = None;
    }
}
