use serde_json::Value as JsonValue;

/// A declared expectation checked against a step's normalized response.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Assertion {
    StatusCode {
        expected: u16,
    },
    ResponseTime {
        #[serde(rename = "maxMs")]
        max_ms: u64,
    },
    Header {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected: Option<String>,
    },
    BodyContains {
        value: String,
    },
    /// Without `expected` this is an existence check.
    JsonPath {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected: Option<JsonValue>,
    },
}

impl Assertion {
    pub fn kind(&self) -> &'static str {
        match self {
            Assertion::StatusCode { .. } => "statusCode",
            Assertion::ResponseTime { .. } => "responseTime",
            Assertion::Header { .. } => "header",
            Assertion::BodyContains { .. } => "bodyContains",
            Assertion::JsonPath { .. } => "jsonPath",
        }
    }
}
