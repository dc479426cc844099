use super::operation::{Operation, OperationTracker};
use crate::error::ApiError;
use crate::http::{encode_segment, ApiClient, USERS_PATH};
use crate::types::{NewUser, OperationKind, User, UserUpdate};

fn user_path(id: &str) -> String {
    format!("{USERS_PATH}/{}", encode_segment(id))
}

/// CRUD over `users`, each call announced on the event hub.
#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
    tracker: OperationTracker,
}

impl UserService {
    pub fn new(client: ApiClient, tracker: OperationTracker) -> Self {
        Self { client, tracker }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let op = Operation::new(OperationKind::GetUsers, "Failed to fetch users");
        self.tracker.track(op, self.client.get(USERS_PATH)).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ApiError> {
        let op = Operation::new(OperationKind::GetUser, "Failed to fetch user").target(id);
        self.tracker.track(op, self.client.get(&user_path(id))).await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User, ApiError> {
        let op = Operation::new(OperationKind::UpdateUser, "Failed to update user")
            .target(id)
            .on_success("User updated successfully");
        self.tracker
            .track(op, self.client.put(&user_path(id), update))
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let op = Operation::new(OperationKind::DeleteUser, "Failed to delete user")
            .target(id)
            .on_success("User deleted successfully");
        self.tracker
            .track(op, async {
                self.client.delete(&user_path(id)).await?;
                Ok(())
            })
            .await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        let op = Operation::new(OperationKind::CreateUser, "Failed to create user")
            .on_success("User created successfully");
        self.tracker
            .track(op, self.client.post(USERS_PATH, user))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::events::EventHub;
    use crate::http::testing::{expired, json_response, MockTransport, RecordingNavigator};
    use crate::state::{LoadingTracker, SessionStore};
    use crate::storage::MemoryStore;
    use crate::types::{CredentialPair, EventPhase, OperationEvent};
    use parking_lot::Mutex;
    use reqwest::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        users: UserService,
        transport: Arc<MockTransport>,
        loading: LoadingTracker,
        events: Arc<Mutex<Vec<OperationEvent>>>,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(MockTransport::new());
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.set_tokens(&CredentialPair {
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
        });
        let loading = LoadingTracker::new();
        let client = ApiClient::new(
            AppConfig::new("http://api.test"),
            transport.clone(),
            session,
            loading.clone(),
            Arc::new(RecordingNavigator::default()),
        );
        let hub = EventHub::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let _ = hub.subscribe(move |e| sink.lock().push(e.clone()));
        Fixture {
            users: UserService::new(client, OperationTracker::new(hub)),
            transport,
            loading,
            events,
        }
    }

    fn user_json(id: &str) -> serde_json::Value {
        json!({ "id": id, "email": format!("{id}@example.com") })
    }

    #[tokio::test]
    async fn list_users_completes_without_toast() {
        let f = fixture();
        f.transport.route(Method::GET, "http://api.test/users", |_| {
            json_response(StatusCode::OK, json!([user_json("1"), user_json("2")]))
        });

        let users = f.users.list_users().await.unwrap();

        assert_eq!(users.len(), 2);
        let last = f.events.lock().last().cloned().unwrap();
        assert_eq!(last.kind, OperationKind::GetUsers);
        assert_eq!(last.phase, EventPhase::Completed);
        assert!(!last.toast);
        assert_eq!(f.loading.count(), 0);
    }

    #[tokio::test]
    async fn get_user_encodes_id_and_tags_events() {
        let f = fixture();
        f.transport.route(Method::GET, "http://api.test/users/a%2Fb", |_| {
            json_response(StatusCode::OK, user_json("a/b"))
        });

        let user = f.users.get_user("a/b").await.unwrap();

        assert_eq!(user.id, "a/b");
        let events = f.events.lock().clone();
        assert!(events.iter().all(|e| e.target_id.as_deref() == Some("a/b")));
    }

    #[tokio::test]
    async fn update_user_sends_only_present_fields() {
        let f = fixture();
        f.transport.route(Method::PUT, "http://api.test/users/7", |req| {
            let mut body = user_json("7");
            body["name"] = req.body.clone().unwrap_or_default()["name"].clone();
            json_response(StatusCode::OK, body)
        });

        let update = UserUpdate {
            name: Some("Grace".to_string()),
            ..UserUpdate::default()
        };
        let user = f.users.update_user("7", &update).await.unwrap();

        assert_eq!(user.name.as_deref(), Some("Grace"));
        let sent = f.transport.last_request().unwrap();
        assert_eq!(sent.body, Some(json!({ "name": "Grace" })));
        let last = f.events.lock().last().cloned().unwrap();
        assert_eq!(last.message.as_deref(), Some("User updated successfully"));
        assert!(last.toast);
    }

    #[tokio::test]
    async fn delete_user_failure_carries_target_and_fallback() {
        let f = fixture();
        f.transport.route(Method::DELETE, "http://api.test/users/9", |_| {
            json_response(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "db" }))
        });

        f.users.delete_user("9").await.unwrap_err();

        let last = f.events.lock().last().cloned().unwrap();
        assert_eq!(last.kind, OperationKind::DeleteUser);
        assert_eq!(last.phase, EventPhase::Error);
        assert_eq!(last.target_id.as_deref(), Some("9"));
        assert_eq!(last.message.as_deref(), Some("Failed to delete user"));
    }

    #[tokio::test]
    async fn delete_user_accepts_empty_body() {
        let f = fixture();
        f.transport.route(Method::DELETE, "http://api.test/users/9", |_| {
            crate::http::ApiResponse::new(StatusCode::NO_CONTENT, Vec::new())
        });

        f.users.delete_user("9").await.unwrap();

        let last = f.events.lock().last().cloned().unwrap();
        assert_eq!(last.message.as_deref(), Some("User deleted successfully"));
    }

    #[tokio::test]
    async fn create_user_posts_payload() {
        let f = fixture();
        f.transport.route(Method::POST, "http://api.test/users", |_| {
            json_response(StatusCode::CREATED, user_json("new"))
        });

        let payload = NewUser {
            name: "Linus".to_string(),
            email: "new@example.com".to_string(),
            password: None,
            role: Some("admin".to_string()),
        };
        let created = f.users.create_user(&payload).await.unwrap();

        assert_eq!(created.id, "new");
        let sent = f.transport.last_request().unwrap();
        assert_eq!(
            sent.body,
            Some(json!({ "name": "Linus", "email": "new@example.com", "role": "admin" }))
        );
        let last = f.events.lock().last().cloned().unwrap();
        assert_eq!(last.kind, OperationKind::CreateUser);
        assert_eq!(last.message.as_deref(), Some("User created successfully"));
    }

    #[tokio::test]
    async fn expired_token_is_recovered_inside_one_operation() {
        let f = fixture();
        f.transport.route(Method::GET, "http://api.test/users", |req| {
            if req.bearer_token() == Some("access-2") {
                json_response(StatusCode::OK, json!([]))
            } else {
                expired()
            }
        });
        f.transport.route(Method::POST, "http://api.test/auth/refresh", |_| {
            json_response(StatusCode::OK, json!({ "accessToken": "access-2" }))
        });

        f.users.list_users().await.unwrap();

        let phases: Vec<EventPhase> = f.events.lock().iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![EventPhase::InProgress, EventPhase::Completed]);
        assert_eq!(f.loading.count(), 0);
    }
}
