//! Unary gRPC over HTTP/2 using the `application/grpc+json` content subtype, so messages
//! travel as JSON inside standard length-prefixed frames and no descriptors are needed.

use std::sync::Arc;
use std::time::Instant;

use apichain_core::types::Headers;
use apichain_core::{ApiRequest, GrpcRequest};
use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};

use crate::config::ExecutorConfig;
use crate::http::{HttpClient, HttpRequestParts, HttpResponseParts};
use crate::protocol::{ProtocolError, ProtocolHandler};
use crate::response::{millis, parse_body, NormalizedResponse};

const CONTENT_TYPE: &str = "application/grpc+json";
const FRAME_HEADER_LEN: usize = 5;

pub struct GrpcHandler {
    http: Arc<dyn HttpClient>,
    config: ExecutorConfig,
}

impl GrpcHandler {
    /// `http` must speak HTTP/2 (see `ReqwestHttpClient::http2_prior_knowledge`).
    pub fn new(http: Arc<dyn HttpClient>, config: ExecutorConfig) -> Self {
        Self { http, config }
    }

    fn build(&self, req: &GrpcRequest) -> Result<HttpRequestParts, ProtocolError> {
        let endpoint = req.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ProtocolError::InvalidRequest("endpoint is required".to_string()));
        }
        let service = req.service.trim();
        if service.is_empty() {
            return Err(ProtocolError::InvalidRequest("service is required".to_string()));
        }
        let method = req.method.trim();
        if method.is_empty() {
            return Err(ProtocolError::InvalidRequest("method is required".to_string()));
        }

        let base = if endpoint.contains("://") {
            endpoint.to_string()
        } else if req.tls.unwrap_or(false) {
            format!("https://{endpoint}")
        } else {
            format!("http://{endpoint}")
        };
        let url = url::Url::parse(&format!("{}/{service}/{method}", base.trim_end_matches('/')))
            .map_err(|e| ProtocolError::InvalidRequest(format!("invalid endpoint `{endpoint}`: {e}")))?;

        let mut headers: Headers = req
            .metadata
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        headers.insert("content-type".to_string(), CONTENT_TYPE.to_string());
        headers.insert("te".to_string(), "trailers".to_string());

        let message: Map<String, JsonValue> = req.message.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let payload = serde_json::to_vec(&JsonValue::Object(message))
            .map_err(|e| ProtocolError::InvalidRequest(format!("message: {e}")))?;

        Ok(HttpRequestParts {
            method: "POST".to_string(),
            url,
            headers,
            body: encode_frame(&payload),
        })
    }
}

#[async_trait]
impl ProtocolHandler for GrpcHandler {
    fn protocol(&self) -> &'static str {
        ApiRequest::GRPC
    }

    fn validate(&self, request: &ApiRequest) -> Result<(), ProtocolError> {
        match request {
            ApiRequest::Grpc(req) => self.build(req).map(|_| ()),
            other => Err(ProtocolError::InvalidRequest(format!(
                "expected a grpc request, got {}",
                other.protocol()
            ))),
        }
    }

    async fn execute(&self, request: &ApiRequest) -> NormalizedResponse {
        let started = Instant::now();
        let parts = match request {
            ApiRequest::Grpc(req) => self.build(req),
            other => Err(ProtocolError::InvalidRequest(format!(
                "expected a grpc request, got {}",
                other.protocol()
            ))),
        };
        let parts = match parts {
            Ok(p) => p,
            Err(e) => return NormalizedResponse::failure("invalid_request", e.to_string(), started.elapsed()),
        };

        tracing::debug!(url = %parts.url, "grpc call");
        let started = Instant::now();
        match self
            .http
            .send(parts, self.config.request_timeout, self.config.max_response_bytes)
            .await
        {
            Ok(resp) => normalize(resp, millis(started.elapsed())),
            Err(e) => NormalizedResponse::transport_failure(&e, started.elapsed()),
        }
    }
}

fn normalize(resp: HttpResponseParts, duration: u64) -> NormalizedResponse {
    let message = decode_first_frame(&resp.body);
    let mut headers = resp.headers;

    if resp.status != 200 {
        // Not a gRPC response at all (proxy error, wrong port).
        return NormalizedResponse {
            status_code: resp.status,
            headers,
            body: message.unwrap_or_else(|| parse_body(&resp.body)),
            duration,
        };
    }

    let reported = headers
        .get("grpc-status")
        .and_then(|s| s.trim().parse::<u32>().ok());
    // Trailers are not visible through the client; a delivered message implies OK.
    let code = match (reported, &message) {
        (Some(code), _) => code,
        (None, Some(_)) => 0,
        (None, None) => 2,
    };
    let grpc_message = headers
        .get("grpc-message")
        .map(|m| urlencoding::decode(m).map(|d| d.into_owned()).unwrap_or_else(|_| m.clone()));
    headers.insert("grpc-status".to_string(), code.to_string());

    let body = if code == 0 {
        message.unwrap_or(JsonValue::Null)
    } else {
        json!({ "grpcStatus": code, "grpcMessage": grpc_message })
    };

    NormalizedResponse {
        status_code: grpc_status_to_http(code),
        headers,
        body,
        duration,
    }
}

/// Maps a gRPC status code onto the closest HTTP status.
pub fn grpc_status_to_http(code: u32) -> u16 {
    match code {
        0 => 200,
        1 => 499,
        2 => 500,
        3 => 400,
        4 => 504,
        5 => 404,
        6 => 409,
        7 => 403,
        8 => 429,
        9 => 400,
        10 => 409,
        11 => 400,
        12 => 501,
        13 => 500,
        14 => 503,
        15 => 500,
        16 => 401,
        _ => 500,
    }
}

fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    out.push(0);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn decode_first_frame(body: &[u8]) -> Option<JsonValue> {
    if body.len() < FRAME_HEADER_LEN {
        return None;
    }
    let compressed = body[0] == 1;
    let len = u32::from_be_bytes([body[1], body[2], body[3], body[4]]) as usize;
    let payload = body.get(FRAME_HEADER_LEN..FRAME_HEADER_LEN + len)?;
    if compressed {
        return Some(JsonValue::String("<compressed message>".to_string()));
    }
    Some(parse_body(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn frame_round_trip() {
        let framed = encode_frame(br#"{"name":"world"}"#);
        assert_eq!(&framed[..5], &[0, 0, 0, 0, 16]);
        assert_eq!(decode_first_frame(&framed), Some(json!({"name": "world"})));
    }

    #[test]
    fn truncated_frame_is_ignored() {
        let mut framed = encode_frame(b"{}");
        framed.pop();
        assert_eq!(decode_first_frame(&framed), None);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(grpc_status_to_http(0), 200);
        assert_eq!(grpc_status_to_http(5), 404);
        assert_eq!(grpc_status_to_http(14), 503);
        assert_eq!(grpc_status_to_http(16), 401);
        assert_eq!(grpc_status_to_http(99), 500);
    }

    #[test]
    fn trailers_only_error_is_mapped() {
        let resp = HttpResponseParts {
            status: 200,
            headers: BTreeMap::from([
                ("grpc-status".to_string(), "5".to_string()),
                ("grpc-message".to_string(), "user%20not%20found".to_string()),
            ]),
            body: vec![],
        };
        let r = normalize(resp, 3);
        assert_eq!(r.status_code, 404);
        assert_eq!(r.body["grpcMessage"], "user not found");
    }

    #[test]
    fn bare_endpoint_gets_scheme_and_path() {
        let h = GrpcHandler::new(
            Arc::new(crate::http::ReqwestHttpClient::new(&ExecutorConfig::default()).unwrap()),
            ExecutorConfig::default(),
        );
        let req = GrpcRequest {
            endpoint: "localhost:50051".to_string(),
            service: "helloworld.Greeter".to_string(),
            method: "SayHello".to_string(),
            message: BTreeMap::from([("name".to_string(), json!("world"))]),
            metadata: BTreeMap::from([("X-Trace".to_string(), "abc".to_string())]),
            tls: None,
        };
        let parts = h.build(&req).unwrap();
        assert_eq!(parts.url.as_str(), "http://localhost:50051/helloworld.Greeter/SayHello");
        assert_eq!(parts.headers.get("content-type").map(String::as_str), Some(CONTENT_TYPE));
        assert_eq!(parts.headers.get("x-trace").map(String::as_str), Some("abc"));
    }
}
