use super::operation::{Operation, OperationTracker};
use crate::error::ApiError;
use crate::http::{ApiClient, ApiRequest, LOGIN_PATH, LOGOUT_PATH, ME_PATH, REGISTER_PATH};
use crate::types::{AuthResponse, LoginRequest, OperationEvent, OperationKind, RegisterRequest, User};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    tracker: OperationTracker,
}

impl AuthService {
    pub fn new(client: ApiClient, tracker: OperationTracker) -> Self {
        Self { client, tracker }
    }

    /// Signs in and stores the issued tokens and profile.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let op = Operation::new(OperationKind::Login, "Login failed").on_success("Login successful");
        self.tracker
            .track(op, async {
                let response: AuthResponse = self.client.post(LOGIN_PATH, request).await?;
                let session = self.client.session();
                session.set_tokens(&response.credentials());
                session.update_user(Some(response.user.clone()));
                info!(user_id = %response.user.id, "Signed in");
                Ok(response)
            })
            .await
    }

    /// Creates an account. The caller still has to log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let op = Operation::new(OperationKind::Register, "Registration failed")
            .on_success("Registration successful");
        self.tracker
            .track(op, self.client.post(REGISTER_PATH, request))
            .await
    }

    /// Never fails: a rejected logout call still ends the local session.
    pub async fn logout(&self) {
        let hub = self.tracker.hub();
        hub.send_event(OperationEvent::in_progress(OperationKind::Logout));

        if let Err(err) = self.client.execute(ApiRequest::post(LOGOUT_PATH)).await {
            warn!(error = %err, "Logout request failed; clearing local session anyway");
        }
        self.client.session().clear();

        hub.send_event(
            OperationEvent::completed(OperationKind::Logout)
                .with_message("Logged out successfully")
                .with_toast(true),
        );
    }

    /// Cached profile, else `auth/me` when a token is stored. Failures yield `None`.
    pub async fn current_user(&self) -> Option<User> {
        let session = self.client.session();
        if let Some(user) = session.user() {
            return Some(user);
        }
        if !session.is_authenticated() {
            return None;
        }

        match self.client.get::<User>(ME_PATH).await {
            Ok(user) => {
                session.update_user(Some(user.clone()));
                Some(user)
            }
            Err(err) => {
                debug!(error = %err, "Could not load current user");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }
}
