//! Keeps credentials out of the log file.
//!
//! A value is replaced when its key names a credential, or when the value
//! itself has the shape of one (bearer header, JWT, long opaque token).
//! Objects and arrays are scrubbed recursively.

use serde_json::Value;
use std::collections::HashMap;

pub const REDACTED: &str = "[REDACTED]";

/// Strings longer than this are replaced by their byte length.
const MAX_STRING_BYTES: usize = 512;
/// Opaque tokens are at least this long.
const MIN_OPAQUE_TOKEN: usize = 49;

/// Substrings of credential-bearing keys.
const SECRET_KEY_PARTS: &[&str] = &[
    "token",
    "authorization",
    "cookie",
    "password",
    "secret",
    "apikey",
    "api_key",
    "otp",
    "one_time_code",
];

/// Whole keys that are credentials only on their own: `code` is the emailed
/// passcode while `status_code` is not.
const SECRET_KEYS: &[&str] = &["code", "token_hash"];

/// Survivors of [`crate::ObservabilityMode::MetadataOnly`].
pub(crate) const METADATA_FIELDS: &[&str] = &[
    "operation",
    "phase",
    "user_id",
    "request_id",
    "status",
    "elapsed_ms",
];

pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_KEYS.contains(&key.as_str()) || SECRET_KEY_PARTS.iter().any(|part| key.contains(part))
}

/// Copy of `fields` with every credential replaced by [`REDACTED`].
pub fn sanitize_fields(fields: &HashMap<String, Value>) -> HashMap<String, Value> {
    fields
        .iter()
        .map(|(key, value)| {
            let mut value = value.clone();
            scrub(key, &mut value);
            (key.clone(), value)
        })
        .collect()
}

fn scrub(key: &str, value: &mut Value) {
    if is_sensitive_key(key) {
        *value = Value::from(REDACTED);
        return;
    }
    match value {
        Value::Object(map) => map.iter_mut().for_each(|(k, v)| scrub(k, v)),
        Value::Array(items) => items.iter_mut().for_each(|item| scrub(key, item)),
        Value::String(text) => {
            if secret_shaped(text) {
                *text = REDACTED.to_string();
            } else if text.len() > MAX_STRING_BYTES {
                *text = format!("[TRUNCATED:{} bytes]", text.len());
            }
        }
        _ => {}
    }
}

fn secret_shaped(text: &str) -> bool {
    let has_bearer_prefix = text
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "));
    has_bearer_prefix || is_jwt(text) || is_opaque_token(text)
}

/// Three dot-separated base64url segments.
fn is_jwt(text: &str) -> bool {
    let segments: Vec<&str> = text.split('.').collect();
    text.len() > 40
        && segments.len() == 3
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.bytes().all(is_base64_byte))
}

fn is_opaque_token(text: &str) -> bool {
    text.len() >= MIN_OPAQUE_TOKEN && text.bytes().all(is_base64_byte)
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'_' | b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scrubbed(pairs: Value) -> Value {
        let fields: HashMap<String, Value> = serde_json::from_value(pairs).unwrap();
        serde_json::to_value(sanitize_fields(&fields)).unwrap()
    }

    #[test]
    fn credential_keys() {
        let out = scrubbed(json!({
            "access_token": "abc",
            "code": "123456",
            "email": "a@example.com",
            "status_code": 406,
        }));
        assert_eq!(out["access_token"], REDACTED);
        assert_eq!(out["code"], REDACTED);
        assert_eq!(out["email"], "a@example.com");
        assert_eq!(out["status_code"], 406);
    }

    #[test]
    fn credential_shaped_values() {
        let jwt = format!("{}.{}.{}", "a".repeat(20), "b".repeat(20), "c".repeat(10));
        let out = scrubbed(json!({
            "header": "Bearer abc.def",
            "value": jwt,
            "hex": "f".repeat(64),
            "sentence": "the session expired at noon, please sign in again",
        }));
        assert_eq!(out["header"], REDACTED);
        assert_eq!(out["value"], REDACTED);
        assert_eq!(out["hex"], REDACTED);
        assert_eq!(out["sentence"], "the session expired at noon, please sign in again");
    }

    #[test]
    fn nested_values() {
        let out = scrubbed(json!({
            "body": { "refresh_token": "r", "user": { "id": "u-1" } },
            "sessions": [{ "access_token": "a" }],
        }));
        assert_eq!(out["body"]["refresh_token"], REDACTED);
        assert_eq!(out["body"]["user"]["id"], "u-1");
        assert_eq!(out["sessions"][0]["access_token"], REDACTED);
    }

    #[test]
    fn oversized_strings() {
        let out = scrubbed(json!({ "body": "word ".repeat(200) }));
        assert_eq!(out["body"], "[TRUNCATED:1000 bytes]");
    }
}
