use std::sync::Arc;
use std::time::Instant;

use apichain_core::{ApiRequest, RestRequest};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::config::ExecutorConfig;
use crate::http::{HttpClient, HttpRequestParts};
use crate::protocol::{has_header, resolve_endpoint, ProtocolError, ProtocolHandler};
use crate::response::NormalizedResponse;

const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

pub struct RestHandler {
    http: Arc<dyn HttpClient>,
    config: ExecutorConfig,
}

impl RestHandler {
    pub fn new(http: Arc<dyn HttpClient>, config: ExecutorConfig) -> Self {
        Self { http, config }
    }

    fn build(&self, req: &RestRequest) -> Result<HttpRequestParts, ProtocolError> {
        let method = req.method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(ProtocolError::InvalidRequest("method is required".to_string()));
        }
        if !METHODS.contains(&method.as_str()) {
            return Err(ProtocolError::InvalidRequest(format!("unsupported method: {}", req.method)));
        }

        let mut url = resolve_endpoint(&req.endpoint, self.config.base_url.as_deref())
            .map_err(ProtocolError::InvalidRequest)?;
        if !req.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &req.query_params {
                pairs.append_pair(k, v);
            }
        }

        let mut headers = req.headers.clone();
        let body = match &req.body {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::String(s)) => s.clone().into_bytes(),
            Some(v) => {
                if !has_header(&headers, "content-type") {
                    headers.insert("Content-Type".to_string(), "application/json".to_string());
                }
                serde_json::to_vec(v).map_err(|e| ProtocolError::InvalidRequest(format!("body: {e}")))?
            }
        };

        Ok(HttpRequestParts { method, url, headers, body })
    }
}

#[async_trait]
impl ProtocolHandler for RestHandler {
    fn protocol(&self) -> &'static str {
        ApiRequest::REST
    }

    fn validate(&self, request: &ApiRequest) -> Result<(), ProtocolError> {
        let ApiRequest::Rest(req) = request else {
            return Err(ProtocolError::InvalidRequest(format!(
                "expected a rest request, got {}",
                request.protocol()
            )));
        };
        self.build(req).map(|_| ())
    }

    async fn execute(&self, request: &ApiRequest) -> NormalizedResponse {
        let started = Instant::now();
        let parts = match request {
            ApiRequest::Rest(req) => self.build(req),
            other => Err(ProtocolError::InvalidRequest(format!(
                "expected a rest request, got {}",
                other.protocol()
            ))),
        };
        let parts = match parts {
            Ok(p) => p,
            Err(e) => return NormalizedResponse::failure("invalid_request", e.to_string(), started.elapsed()),
        };

        tracing::debug!(method = %parts.method, url = %parts.url, "rest request");
        let started = Instant::now();
        match self
            .http
            .send(parts, self.config.request_timeout, self.config.max_response_bytes)
            .await
        {
            Ok(resp) => NormalizedResponse::from_parts(resp, started.elapsed()),
            Err(e) => {
                tracing::debug!(error = %e, "rest transport failure");
                NormalizedResponse::transport_failure(&e, started.elapsed())
            }
        }
    }
}
