//! Finds a bearer/access token in a JSON response body.

use serde_json::Value;

/// Keys checked in priority order. Matching is case-sensitive.
pub const TOKEN_KEYS: [&str; 3] = ["access_token", "token", "accessToken"];

/// Return the first non-empty string stored under one of `TOKEN_KEYS`.
pub fn extract_token(json: &Value) -> Option<String> {
    let object = json.as_object()?;
    TOKEN_KEYS
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_access_token() {
        assert_eq!(
            extract_token(&json!({"access_token": "abc123"})),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn honors_priority_order() {
        let body = json!({"accessToken": "yyy", "token": "zzz"});
        assert_eq!(extract_token(&body), Some("zzz".to_string()));

        let body = json!({"accessToken": "yyy", "token": "zzz", "access_token": "xxx"});
        assert_eq!(extract_token(&body), Some("xxx".to_string()));
    }

    #[test]
    fn empty_values_fall_through() {
        let body = json!({"access_token": "", "accessToken": "yyy"});
        assert_eq!(extract_token(&body), Some("yyy".to_string()));
    }

    #[test]
    fn keys_are_case_sensitive() {
        assert_eq!(extract_token(&json!({"Access_Token": "abc", "TOKEN": "def"})), None);
    }

    #[test]
    fn non_string_and_nested_values_are_ignored() {
        assert_eq!(extract_token(&json!({"token": 42})), None);
        assert_eq!(extract_token(&json!({"data": {"token": "inner"}})), None);
        assert_eq!(extract_token(&json!(["access_token"])), None);
    }
}
