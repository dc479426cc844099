use serde_json::{Map as JsonMap, Value};

const AUTH_PATH_MARKERS: [&str; 4] = ["login", "register", "refresh", "forgot-password"];

/// Whether `url` targets an endpoint that must not carry a bearer token.
pub fn is_auth_url(url: Option<&str>) -> bool {
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        return false;
    };
    AUTH_PATH_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Joins an API-relative path onto `base`; anything starting with `http` is
/// already absolute and left as is.
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// `?a=1&tag=x&tag=y` from a JSON object. Null, empty-string, and nested
/// object values are skipped; arrays repeat the key.
pub fn build_query_string(params: &JsonMap<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = query_text(item) {
                        pairs.push(format!("{}={}", encode_segment(key), encode_segment(&text)));
                    }
                }
            }
            other => {
                if let Some(text) = query_text(other) {
                    pairs.push(format!("{}={}", encode_segment(key), encode_segment(&text)));
                }
            }
        }
    }
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) | Value::Array(_) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_urls_are_detected_by_substring() {
        assert!(is_auth_url(Some("auth/login")));
        assert!(is_auth_url(Some("auth/register")));
        assert!(is_auth_url(Some("http://api.test/auth/refresh")));
        assert!(is_auth_url(Some("auth/forgot-password")));
        assert!(!is_auth_url(Some("users")));
        assert!(!is_auth_url(Some("auth/LOGIN")));
        assert!(!is_auth_url(Some("")));
        assert!(!is_auth_url(None));
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        assert_eq!(resolve_url("http://api.test", "users"), "http://api.test/users");
        assert_eq!(resolve_url("http://api.test/", "/users/1"), "http://api.test/users/1");
        assert_eq!(resolve_url("http://api.test", "http://other/x"), "http://other/x");
        assert_eq!(resolve_url("http://api.test", "https://other/x"), "https://other/x");
    }

    #[test]
    fn query_string_skips_empty_and_repeats_arrays() {
        let params = json!({
            "page": 2,
            "q": "ada lovelace",
            "empty": "",
            "missing": null,
            "role": ["admin", "editor"],
            "active": true,
        });
        let query = build_query_string(params.as_object().unwrap());
        assert_eq!(query, "?active=true&page=2&q=ada%20lovelace&role=admin&role=editor");
    }

    #[test]
    fn query_string_is_empty_without_params() {
        let params = json!({"a": null, "b": ""});
        assert_eq!(build_query_string(params.as_object().unwrap()), "");
    }
}
