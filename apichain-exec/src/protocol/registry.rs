use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ExecutorConfig;
use crate::http::{HttpClient, HttpError, ReqwestHttpClient};
use crate::protocol::{GraphQlHandler, GrpcHandler, ProtocolError, ProtocolHandler, RestHandler};

/// Handlers keyed by protocol tag.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn ProtocolHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// REST, GraphQL and gRPC over real reqwest clients.
    pub fn with_defaults(config: &ExecutorConfig) -> Result<Self, HttpError> {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(config)?);
        let h2: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::http2_prior_knowledge(config)?);
        Ok(Self::with_clients(config, http, h2))
    }

    /// `http` serves REST and GraphQL, `h2` serves gRPC.
    pub fn with_clients(
        config: &ExecutorConfig,
        http: Arc<dyn HttpClient>,
        h2: Arc<dyn HttpClient>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RestHandler::new(http.clone(), config.clone())));
        registry.register(Arc::new(GraphQlHandler::new(http, config.clone())));
        registry.register(Arc::new(GrpcHandler::new(h2, config.clone())));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ProtocolHandler>) {
        self.handlers.insert(handler.protocol().to_string(), handler);
    }

    pub fn get(&self, protocol: &str) -> Result<Arc<dyn ProtocolHandler>, ProtocolError> {
        self.handlers
            .get(&protocol.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| ProtocolError::InvalidProtocol(protocol.to_string()))
    }
}
