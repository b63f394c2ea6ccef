use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::types::Headers;

/// A request tagged by its `protocol` field.
///
/// Unknown tags are kept as [`ApiRequest::Unsupported`] instead of failing the whole
/// document, so the executor can reject just that step at dispatch time.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Rest(RestRequest),
    GraphQl(GraphQlRequest),
    Grpc(GrpcRequest),
    Unsupported(UnsupportedRequest),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestRequest {
    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(rename = "queryParams")]
    pub query_params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlRequest {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, JsonValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrpcRequest {
    /// `host:port` or a full `http(s)://` URL.
    #[serde(default)]
    pub endpoint: String,

    /// Fully-qualified service name, e.g. `helloworld.Greeter`.
    #[serde(default)]
    pub service: String,

    #[serde(default)]
    pub method: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub message: BTreeMap<String, JsonValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Headers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedRequest {
    pub protocol: String,
    /// The raw request object, `protocol` field included.
    pub raw: JsonValue,
}

impl ApiRequest {
    pub const REST: &'static str = "rest";
    pub const GRAPHQL: &'static str = "graphql";
    pub const GRPC: &'static str = "grpc";

    /// Protocol tag used for handler lookup.
    pub fn protocol(&self) -> &str {
        match self {
            ApiRequest::Rest(_) => Self::REST,
            ApiRequest::GraphQl(_) => Self::GRAPHQL,
            ApiRequest::Grpc(_) => Self::GRPC,
            ApiRequest::Unsupported(u) => &u.protocol,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ApiRequest::Rest(r) => Some(&r.endpoint),
            ApiRequest::GraphQl(g) => Some(&g.endpoint),
            ApiRequest::Grpc(g) => Some(&g.endpoint),
            ApiRequest::Unsupported(u) => u.raw.get("endpoint").and_then(|v| v.as_str()),
        }
    }

    /// Sets a header (gRPC: metadata entry), replacing any existing one case-insensitively.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let headers = match self {
            ApiRequest::Rest(r) => &mut r.headers,
            ApiRequest::GraphQl(g) => &mut g.headers,
            ApiRequest::Grpc(g) => &mut g.metadata,
            ApiRequest::Unsupported(_) => return,
        };
        headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        headers.insert(name.to_string(), value.into());
    }

    pub fn headers(&self) -> Option<&Headers> {
        match self {
            ApiRequest::Rest(r) => Some(&r.headers),
            ApiRequest::GraphQl(g) => Some(&g.headers),
            ApiRequest::Grpc(g) => Some(&g.metadata),
            ApiRequest::Unsupported(_) => None,
        }
    }

    pub fn from_value(value: JsonValue) -> Result<Self, serde_json::Error> {
        let protocol = value
            .get("protocol")
            .and_then(|p| p.as_str())
            .unwrap_or(Self::REST)
            .trim()
            .to_ascii_lowercase();

        match protocol.as_str() {
            "rest" | "http" => Ok(ApiRequest::Rest(serde_json::from_value(value)?)),
            "graphql" => Ok(ApiRequest::GraphQl(serde_json::from_value(value)?)),
            "grpc" => Ok(ApiRequest::Grpc(serde_json::from_value(value)?)),
            _ => Ok(ApiRequest::Unsupported(UnsupportedRequest {
                protocol,
                raw: value,
            })),
        }
    }

    pub fn to_value(&self) -> Result<JsonValue, serde_json::Error> {
        let (tag, mut value) = match self {
            ApiRequest::Rest(r) => (Self::REST, serde_json::to_value(r)?),
            ApiRequest::GraphQl(g) => (Self::GRAPHQL, serde_json::to_value(g)?),
            ApiRequest::Grpc(g) => (Self::GRPC, serde_json::to_value(g)?),
            ApiRequest::Unsupported(u) => return Ok(u.raw.clone()),
        };
        if let Some(map) = value.as_object_mut() {
            map.insert("protocol".to_string(), JsonValue::String(tag.to_string()));
        }
        Ok(value)
    }
}

impl Serialize for ApiRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ApiRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("apiRequest must be an object"));
        }
        ApiRequest::from_value(value).map_err(serde::de::Error::custom)
    }
}
