use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    #[default]
    Default,
    Login,
    Logout,
    Register,
    GetUsers,
    GetUser,
    UpdateUser,
    DeleteUser,
    CreateUser,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Register => "register",
            Self::GetUsers => "get_users",
            Self::GetUser => "get_user",
            Self::UpdateUser => "update_user",
            Self::DeleteUser => "delete_user",
            Self::CreateUser => "create_user",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPhase {
    #[default]
    Default,
    InProgress,
    Completed,
    Error,
}

impl EventPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Lifecycle notification for a named operation, consumed by spinners and toasts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperationEvent {
    pub kind: OperationKind,
    pub phase: EventPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub spinner: bool,
    #[serde(default)]
    pub popup: bool,
    #[serde(default)]
    pub toast: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl OperationEvent {
    pub fn new(kind: OperationKind, phase: EventPhase) -> Self {
        Self {
            kind,
            phase,
            ..Self::default()
        }
    }

    pub fn in_progress(kind: OperationKind) -> Self {
        Self::new(kind, EventPhase::InProgress).with_spinner(true)
    }

    pub fn completed(kind: OperationKind) -> Self {
        Self::new(kind, EventPhase::Completed)
    }

    pub fn error(kind: OperationKind) -> Self {
        Self::new(kind, EventPhase::Error)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn with_popup(mut self, popup: bool) -> Self {
        self.popup = popup;
        self
    }

    pub fn with_toast(mut self, toast: bool) -> Self {
        self.toast = toast;
        self
    }

    pub fn with_target(mut self, target_id: Option<String>) -> Self {
        self.target_id = target_id;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Profile of the signed-in user. Unknown fields are kept so the cached
/// record round-trips unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl AuthResponse {
    pub fn credentials(&self) -> CredentialPair {
        CredentialPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Partial update; absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_serializes_with_wire_names() {
        let event = OperationEvent::in_progress(OperationKind::GetUser)
            .with_target(Some("42".to_string()));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "GET_USER",
                "phase": "IN_PROGRESS",
                "spinner": true,
                "popup": false,
                "toast": false,
                "targetId": "42",
            })
        );
    }

    #[test]
    fn only_completed_and_error_are_terminal() {
        assert!(EventPhase::Completed.is_terminal());
        assert!(EventPhase::Error.is_terminal());
        assert!(!EventPhase::InProgress.is_terminal());
        assert!(!EventPhase::Default.is_terminal());
    }

    #[test]
    fn popup_event_carries_title() {
        let event = OperationEvent::error(OperationKind::DeleteUser)
            .with_title("Delete failed")
            .with_message("User is still referenced")
            .with_popup(true);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["title"], json!("Delete failed"));
        assert_eq!(value["popup"], json!(true));
        assert_eq!(value["phase"], json!("ERROR"));
    }

    #[test]
    fn user_keeps_unknown_fields() {
        let raw = json!({
            "id": "u1",
            "email": "ada@example.com",
            "createdAt": "2024-03-01T10:00:00Z",
            "department": "research",
        });
        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.extra.get("department"), Some(&json!("research")));
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn refresh_response_rotation_is_optional() {
        let parsed: RefreshResponse =
            serde_json::from_value(json!({"accessToken": "a2"})).unwrap();
        assert_eq!(parsed.refresh_token, None);
    }
}
