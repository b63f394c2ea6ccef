use std::borrow::Cow;

use serde_json::Value as JsonValue;
use serde_json_path::JsonPath;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("invalid path expression `{path}`: {message}")]
    InvalidPath { path: String, message: String },
    #[error("path `{path}` matched nothing")]
    NotFound { path: String },
}

/// Evaluates a JSONPath expression against a response body.
///
/// `$.a`, `$[0].id` and bare `a.b` are accepted. Exactly one match yields the matched
/// value; several matches yield them all as an array, in document order.
pub fn extract(body: &JsonValue, path: &str) -> Result<JsonValue, ExtractionError> {
    let normalized = normalize(path);
    let parsed = JsonPath::parse(&normalized).map_err(|e| ExtractionError::InvalidPath {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let mut nodes = parsed.query(body).all();
    match nodes.len() {
        0 => Err(ExtractionError::NotFound {
            path: path.to_string(),
        }),
        1 => Ok(nodes.remove(0).clone()),
        _ => Ok(JsonValue::Array(nodes.into_iter().cloned().collect())),
    }
}

fn normalize(path: &str) -> Cow<'_, str> {
    let p = path.trim();
    if p.starts_with('$') {
        Cow::Borrowed(p)
    } else if p.starts_with('[') {
        Cow::Owned(format!("${p}"))
    } else {
        Cow::Owned(format!("$.{p}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_top_level_field() {
        let body = json!({"id": 42});
        assert_eq!(extract(&body, "$.id").unwrap(), json!(42));
    }

    #[test]
    fn extracts_from_array_root() {
        let body = json!([{"id": 7}, {"id": 8}]);
        assert_eq!(extract(&body, "$[0].id").unwrap(), json!(7));
    }

    #[test]
    fn wildcard_yields_array() {
        let body = json!({"list": [{"email": "a@x"}, {"email": "b@x"}]});
        assert_eq!(
            extract(&body, "$.list[*].email").unwrap(),
            json!(["a@x", "b@x"])
        );
    }

    #[test]
    fn quoted_keys_with_selector_characters_stay_singular() {
        let body = json!({"a:b": 1, "x..y": 2, "s*": 3});
        assert_eq!(extract(&body, "$['a:b']").unwrap(), json!(1));
        assert_eq!(extract(&body, "$['x..y']").unwrap(), json!(2));
        assert_eq!(extract(&body, "$['s*']").unwrap(), json!(3));
    }

    #[test]
    fn union_selector_keeps_every_match() {
        let body = json!({"l": [1, 2, 3]});
        assert_eq!(extract(&body, "$.l[0,1]").unwrap(), json!([1, 2]));
    }

    #[test]
    fn wildcard_with_one_match_yields_the_value() {
        let body = json!({"list": [{"email": "a@x"}]});
        assert_eq!(extract(&body, "$.list[*].email").unwrap(), json!("a@x"));
    }

    #[test]
    fn bare_path_is_rooted() {
        let body = json!({"data": {"token": "t"}});
        assert_eq!(extract(&body, "data.token").unwrap(), json!("t"));
    }

    #[test]
    fn missing_path_is_an_error_not_a_panic() {
        let body = json!({"id": 1});
        assert_eq!(
            extract(&body, "$.nope").unwrap_err(),
            ExtractionError::NotFound {
                path: "$.nope".to_string()
            }
        );
    }

    #[test]
    fn malformed_path_is_reported() {
        let body = json!({});
        assert!(matches!(
            extract(&body, "$[").unwrap_err(),
            ExtractionError::InvalidPath { .. }
        ));
    }
}
