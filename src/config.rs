use crate::error::ConfigError;
use reqwest::header::HeaderName;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

pub const ENV_API_URL: &str = "API_URL";
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_ACCESS_HEADER: &str = "ACCESS_HEADER";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_ENABLE_ANALYTICS: &str = "ENABLE_ANALYTICS";
pub const ENV_ENABLE_DEBUG: &str = "ENABLE_DEBUG";

/// Deployment-level client identifier sent on every request as
/// `<identifier>-<utc millis>` under a configured header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTag {
    pub header: HeaderName,
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub client_tag: Option<ClientTag>,
    pub request_timeout: Duration,
    pub analytics_enabled: bool,
    pub debug_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl AppConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_base_url(&api_url.into()),
            client_tag: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            analytics_enabled: false,
            debug_enabled: false,
        }
    }

    pub fn with_client_tag(
        mut self,
        identifier: impl Into<String>,
        header: &str,
    ) -> Result<Self, ConfigError> {
        let header = HeaderName::from_bytes(header.trim().as_bytes())
            .map_err(|_| ConfigError::InvalidHeaderName(header.to_string()))?;
        self.client_tag = Some(ClientTag {
            header,
            identifier: identifier.into(),
        });
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::new(get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()));

        if let (Some(identifier), Some(header)) = (get(ENV_ACCESS_TOKEN), get(ENV_ACCESS_HEADER)) {
            config = config.with_client_tag(identifier, &header)?;
        }

        if let Some(raw) = get(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or(
                ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT_SECS,
                    value: raw.clone(),
                },
            )?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.analytics_enabled = parse_flag(ENV_ENABLE_ANALYTICS, get(ENV_ENABLE_ANALYTICS))?;
        config.debug_enabled = parse_flag(ENV_ENABLE_DEBUG, get(ENV_ENABLE_DEBUG))?;

        Ok(config)
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}
