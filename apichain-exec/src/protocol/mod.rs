//! One [`ProtocolHandler`] per wire protocol, selected by the request's `protocol` tag.

mod graphql;
mod grpc;
mod registry;
mod rest;

use apichain_core::{ApiRequest, ErrorKind};
use async_trait::async_trait;

pub use graphql::GraphQlHandler;
pub use grpc::{grpc_status_to_http, GrpcHandler};
pub use registry::HandlerRegistry;
pub use rest::RestHandler;

use crate::response::NormalizedResponse;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unsupported protocol: {0}")]
    InvalidProtocol(String),
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ProtocolError::InvalidProtocol(_) => ErrorKind::InvalidProtocol,
        }
    }
}

#[async_trait]
pub trait ProtocolHandler: Send + Sync {
    /// Tag this handler is registered under.
    fn protocol(&self) -> &'static str;

    /// Well-formedness check; never touches the network.
    fn validate(&self, request: &ApiRequest) -> Result<(), ProtocolError>;

    /// Performs the call. Transport failures come back as a failed response, not an error.
    async fn execute(&self, request: &ApiRequest) -> NormalizedResponse;
}

/// Absolute endpoints are used as-is; relative ones are appended to `base_url`.
pub(crate) fn resolve_endpoint(endpoint: &str, base_url: Option<&str>) -> Result<url::Url, String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err("endpoint is required".to_string());
    }
    match url::Url::parse(endpoint) {
        Ok(u) => Ok(u),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let Some(base) = base_url else {
                return Err(format!(
                    "endpoint `{endpoint}` is relative and no base URL is configured"
                ));
            };
            let joined = format!(
                "{}/{}",
                base.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            );
            url::Url::parse(&joined).map_err(|e| format!("invalid endpoint `{joined}`: {e}"))
        }
        Err(e) => Err(format!("invalid endpoint `{endpoint}`: {e}")),
    }
}

fn has_header(headers: &apichain_core::types::Headers, name: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}
