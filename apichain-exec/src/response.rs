use std::time::Duration;

use apichain_core::types::Headers;
use serde_json::{json, Value as JsonValue};

use crate::http::{HttpError, HttpResponseParts};

/// Protocol-independent view of one response.
///
/// A transport failure (timeout, refused connection, oversized body) is represented
/// as `statusCode: 0` with `body.error = { kind, message }`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    #[serde(default)]
    pub headers: Headers,

    #[serde(default)]
    pub body: JsonValue,

    /// Milliseconds from just before dispatch to just after completion.
    pub duration: u64,
}

impl NormalizedResponse {
    pub fn from_parts(parts: HttpResponseParts, elapsed: Duration) -> Self {
        Self {
            status_code: parts.status,
            headers: parts.headers,
            body: parse_body(&parts.body),
            duration: millis(elapsed),
        }
    }

    pub fn transport_failure(err: &HttpError, elapsed: Duration) -> Self {
        Self::failure(err.kind(), err.to_string(), elapsed)
    }

    pub fn failure(kind: &str, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status_code: 0,
            headers: Headers::new(),
            body: json!({ "error": { "kind": kind, "message": message.into() } }),
            duration: millis(elapsed),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status_code == 0
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `body.error.message` of a transport failure.
    pub fn failure_message(&self) -> Option<&str> {
        if !self.is_transport_failure() {
            return None;
        }
        self.body.pointer("/error/message").and_then(|m| m.as_str())
    }
}

/// JSON when the payload parses, the lossy UTF-8 text otherwise; `null` when empty.
pub fn parse_body(bytes: &[u8]) -> JsonValue {
    if bytes.is_empty() {
        return JsonValue::Null;
    }
    match serde_json::from_slice::<JsonValue>(bytes) {
        Ok(v) => v,
        Err(_) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
