use crate::http::ApiResponse;
use crate::redact::redact_secrets;
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Server message that marks an access token as expired rather than invalid.
pub const EXPIRED_TOKEN_MESSAGE: &str = "Expired JWT Token";

const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = redact_secrets(&err.to_string()).into_owned();
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(message)
        } else {
            Self::Other(message)
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] TransportError),
    #[error("request failed with status {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
        body: String,
    },
    #[error("no refresh token available")]
    NoRefreshToken,
    #[error("session refresh failed: {0}")]
    RefreshFailed(#[source] Arc<ApiError>),
    #[error("request body could not be encoded: {0}")]
    Encode(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub(crate) fn from_response(response: &ApiResponse) -> Self {
        Self::Status {
            status: response.status,
            message: response.server_message(),
            body: redact_secrets(&response.text()).into_owned(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field of the server's JSON error body, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            Self::RefreshFailed(inner) => inner.server_message(),
            _ => None,
        }
    }

    pub fn is_expired_session(&self) -> bool {
        matches!(
            self,
            Self::Status { status, message: Some(message), .. }
                if *status == StatusCode::UNAUTHORIZED && message == EXPIRED_TOKEN_MESSAGE
        )
    }

    /// Text suitable for a toast: the server's message, then the error itself.
    pub fn user_message(&self) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        let text = self.to_string();
        if text.trim().is_empty() {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            text
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
}
