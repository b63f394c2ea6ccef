use apichain_core::{extract, Assertion};
use serde_json::{json, Value as JsonValue};

use crate::response::NormalizedResponse;

/// Result of checking one assertion against a response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssertionOutcome {
    #[serde(rename = "type")]
    pub kind: String,
    pub passed: bool,
    pub expected: JsonValue,
    pub actual: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn evaluate_all(assertions: &[Assertion], resp: &NormalizedResponse) -> Vec<AssertionOutcome> {
    assertions.iter().map(|a| evaluate(a, resp)).collect()
}

pub fn evaluate(assertion: &Assertion, resp: &NormalizedResponse) -> AssertionOutcome {
    let kind = assertion.kind().to_string();
    match assertion {
        Assertion::StatusCode { expected } => {
            let passed = resp.status_code == *expected;
            outcome(kind, passed, json!(expected), json!(resp.status_code), || {
                format!("expected status {expected}, got {}", resp.status_code)
            })
        }
        Assertion::ResponseTime { max_ms } => {
            let passed = resp.duration <= *max_ms;
            outcome(kind, passed, json!(max_ms), json!(resp.duration), || {
                format!("response took {}ms, limit {max_ms}ms", resp.duration)
            })
        }
        Assertion::Header { name, expected } => {
            let actual = resp.header(name);
            let passed = match (expected, actual) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(e), Some(a)) => e == a,
            };
            outcome(
                kind,
                passed,
                expected.as_ref().map(|e| json!(e)).unwrap_or(JsonValue::Null),
                actual.map(|a| json!(a)).unwrap_or(JsonValue::Null),
                || match actual {
                    None => format!("header `{name}` is missing"),
                    Some(a) => format!("header `{name}` is `{a}`"),
                },
            )
        }
        Assertion::BodyContains { value } => {
            let text = match &resp.body {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            let passed = text.contains(value.as_str());
            outcome(kind, passed, json!(value), JsonValue::Null, || {
                format!("body does not contain `{value}`")
            })
        }
        Assertion::JsonPath { path, expected } => match extract(&resp.body, path) {
            Ok(actual) => {
                let passed = expected.as_ref().map(|e| json_eq(&actual, e)).unwrap_or(true);
                outcome(
                    kind,
                    passed,
                    expected.clone().unwrap_or(JsonValue::Null),
                    actual.clone(),
                    || format!("`{path}` is {actual}"),
                )
            }
            Err(e) => outcome(
                kind,
                false,
                expected.clone().unwrap_or(JsonValue::Null),
                JsonValue::Null,
                || e.to_string(),
            ),
        },
    }
}

fn outcome(
    kind: String,
    passed: bool,
    expected: JsonValue,
    actual: JsonValue,
    message: impl FnOnce() -> String,
) -> AssertionOutcome {
    AssertionOutcome {
        kind,
        passed,
        expected,
        actual,
        message: (!passed).then(message),
    }
}

/// Structural equality with numbers compared by value, so `1` equals `1.0`.
fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64() == b.as_f64(),
        (JsonValue::Array(a), JsonValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| json_eq(x, y))
        }
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).map(|bv| json_eq(v, bv)).unwrap_or(false))
        }
        _ => a == b,
    }
}
