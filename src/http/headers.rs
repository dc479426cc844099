use crate::config::ClientTag;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE};
use time::OffsetDateTime;
use tracing::warn;

pub fn utc_millis() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

pub(crate) fn apply_standard_headers(headers: &mut HeaderMap) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
}

pub(crate) fn set_bearer(headers: &mut HeaderMap, token: &str) {
    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Err(_) => warn!("Stored access token is not a valid header value; sending without it"),
    }
}

/// `<identifier>-<millis>`: a per-request tag, not a signature.
pub fn client_tag_value(identifier: &str, millis: i128) -> String {
    format!("{identifier}-{millis}")
}

pub(crate) fn set_client_tag(headers: &mut HeaderMap, tag: &ClientTag) {
    let value = client_tag_value(&tag.identifier, utc_millis());
    match HeaderValue::from_str(&value) {
        Ok(value) => {
            headers.insert(tag.header.clone(), value);
        }
        Err(_) => warn!(header = %tag.header, "Client identifier is not a valid header value"),
    }
}
