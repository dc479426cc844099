use std::borrow::Cow;

const REDACTED: &str = "REDACTED";

const TOKEN_FIELDS: [&str; 4] = [
    "\"accessToken\"",
    "\"refreshToken\"",
    "\"access_token\"",
    "\"refresh_token\"",
];

fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~' | '+' | '/' | '=')
}

fn redact_bearer(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = find_ascii_case_insensitive(rest, "bearer ") {
        let marker_end = idx + "bearer ".len();
        out.push_str(&rest[..marker_end]);
        rest = &rest[marker_end..];

        let consumed: usize = rest
            .chars()
            .take_while(|ch| is_token_char(*ch))
            .map(char::len_utf8)
            .sum();
        if consumed > 0 {
            out.push_str(REDACTED);
        }
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    out
}

// `"field": "value"` -> `"field": "REDACTED"`; non-string values are left alone.
fn redact_json_field(text: &str, field: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find(field) {
        let field_end = idx + field.len();
        out.push_str(&rest[..field_end]);
        rest = &rest[field_end..];

        let separator: usize = rest
            .chars()
            .take_while(|ch| ch.is_whitespace() || *ch == ':')
            .map(char::len_utf8)
            .sum();
        out.push_str(&rest[..separator]);
        rest = &rest[separator..];

        let Some(value) = rest.strip_prefix('"') else {
            continue;
        };
        let Some(close) = value.find('"') else {
            continue;
        };
        out.push('"');
        out.push_str(REDACTED);
        out.push('"');
        rest = &value[close + 1..];
    }
    out.push_str(rest);
    out
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let nee = needle.as_bytes();
    if nee.is_empty() {
        return Some(0);
    }
    if nee.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - nee.len()).find(|&i| hay[i..i + nee.len()].eq_ignore_ascii_case(nee))
}

/// Removes bearer credentials and token fields from text bound for logs or errors.
pub fn redact_secrets(input: &str) -> Cow<'_, str> {
    let mut value = redact_bearer(input);
    for field in TOKEN_FIELDS {
        if value.contains(field) {
            value = redact_json_field(&value, field);
        }
    }

    if value == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(value)
    }
}

/// Short, log-safe fingerprint of a token.
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        return "****".to_string();
    }
    format!("{prefix}****")
}
