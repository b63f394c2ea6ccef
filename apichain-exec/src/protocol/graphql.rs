use std::sync::Arc;
use std::time::Instant;

use apichain_core::{ApiRequest, GraphQlRequest};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::config::ExecutorConfig;
use crate::http::{HttpClient, HttpRequestParts};
use crate::protocol::{has_header, resolve_endpoint, ProtocolError, ProtocolHandler};
use crate::response::NormalizedResponse;

/// POSTs `{query, variables, operationName}` as JSON. The normalized status is the HTTP
/// status; GraphQL `errors` in a 200 body are left to assertions.
pub struct GraphQlHandler {
    http: Arc<dyn HttpClient>,
    config: ExecutorConfig,
}

impl GraphQlHandler {
    pub fn new(http: Arc<dyn HttpClient>, config: ExecutorConfig) -> Self {
        Self { http, config }
    }

    fn build(&self, req: &GraphQlRequest) -> Result<HttpRequestParts, ProtocolError> {
        let url = resolve_endpoint(&req.endpoint, self.config.base_url.as_deref())
            .map_err(ProtocolError::InvalidRequest)?;
        if req.query.trim().is_empty() {
            return Err(ProtocolError::InvalidRequest("query is required".to_string()));
        }

        let mut payload = Map::new();
        payload.insert("query".to_string(), JsonValue::String(req.query.clone()));
        if let Some(vars) = &req.variables {
            let vars: Map<String, JsonValue> = vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            payload.insert("variables".to_string(), JsonValue::Object(vars));
        }
        if let Some(op) = req.operation_name.as_deref().filter(|op| !op.is_empty()) {
            payload.insert("operationName".to_string(), JsonValue::String(op.to_string()));
        }

        let mut headers = req.headers.clone();
        if !has_header(&headers, "content-type") {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if !has_header(&headers, "accept") {
            headers.insert("Accept".to_string(), "application/json".to_string());
        }

        let body = serde_json::to_vec(&JsonValue::Object(payload))
            .map_err(|e| ProtocolError::InvalidRequest(format!("variables: {e}")))?;
        Ok(HttpRequestParts {
            method: "POST".to_string(),
            url,
            headers,
            body,
        })
    }
}

#[async_trait]
impl ProtocolHandler for GraphQlHandler {
    fn protocol(&self) -> &'static str {
        ApiRequest::GRAPHQL
    }

    fn validate(&self, request: &ApiRequest) -> Result<(), ProtocolError> {
        match request {
            ApiRequest::GraphQl(req) => self.build(req).map(|_| ()),
            other => Err(ProtocolError::InvalidRequest(format!(
                "expected a graphql request, got {}",
                other.protocol()
            ))),
        }
    }

    async fn execute(&self, request: &ApiRequest) -> NormalizedResponse {
        let started = Instant::now();
        let parts = match request {
            ApiRequest::GraphQl(req) => self.build(req),
            other => Err(ProtocolError::InvalidRequest(format!(
                "expected a graphql request, got {}",
                other.protocol()
            ))),
        };
        let parts = match parts {
            Ok(p) => p,
            Err(e) => return NormalizedResponse::failure("invalid_request", e.to_string(), started.elapsed()),
        };

        tracing::debug!(url = %parts.url, "graphql request");
        let started = Instant::now();
        match self
            .http
            .send(parts, self.config.request_timeout, self.config.max_response_bytes)
            .await
        {
            Ok(resp) => NormalizedResponse::from_parts(resp, started.elapsed()),
            Err(e) => NormalizedResponse::transport_failure(&e, started.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpError, HttpResponseParts};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::time::Duration;

    struct Unused;

    #[async_trait]
    impl HttpClient for Unused {
        async fn send(&self, _: HttpRequestParts, _: Duration, _: usize) -> Result<HttpResponseParts, HttpError> {
            Err(HttpError::Other("unused".to_string()))
        }
    }

    fn handler() -> GraphQlHandler {
        GraphQlHandler::new(Arc::new(Unused), ExecutorConfig::default())
    }

    #[test]
    fn query_is_required() {
        let req = ApiRequest::GraphQl(GraphQlRequest {
            endpoint: "https://x.test/graphql".to_string(),
            query: "   ".to_string(),
            ..Default::default()
        });
        assert_eq!(
            handler().validate(&req).unwrap_err(),
            ProtocolError::InvalidRequest("query is required".to_string())
        );
    }

    #[test]
    fn payload_carries_variables_and_operation() {
        let req = GraphQlRequest {
            endpoint: "https://x.test/graphql".to_string(),
            query: "query User($id: ID!) { user(id: $id) { name } }".to_string(),
            variables: Some(BTreeMap::from([("id".to_string(), json!("42"))])),
            operation_name: Some("User".to_string()),
            headers: Default::default(),
        };
        let parts = handler().build(&req).unwrap();
        assert_eq!(parts.method, "POST");
        let payload: JsonValue = serde_json::from_slice(&parts.body).unwrap();
        assert_eq!(payload["variables"]["id"], "42");
        assert_eq!(payload["operationName"], "User");
        assert!(payload["query"].as_str().unwrap().starts_with("query User"));
    }
}
