use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use apichain_core::ApiRequest;
use async_trait::async_trait;
use base64::Engine as _;

use crate::auth::{ApiKeyLocation, AuthConfig, AuthError};
use crate::secrets::{SecretRef, SecretsProvider};

const SECRET_SCHEME: &str = "secrets";

#[async_trait]
pub trait AuthInjector: Send + Sync {
    async fn inject(&self, auth_ref: &str, request: ApiRequest) -> Result<ApiRequest, AuthError>;

    /// Names of headers or query parameters the config writes secrets into.
    fn sensitive_fields(&self, _auth_ref: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Rejects every reference; used when no auth configs are loaded.
pub struct NoAuth;

#[async_trait]
impl AuthInjector for NoAuth {
    async fn inject(&self, auth_ref: &str, _request: ApiRequest) -> Result<ApiRequest, AuthError> {
        Err(AuthError::NotFound(auth_ref.to_string()))
    }
}

/// Auth configs loaded up front, keyed by id.
pub struct StaticAuthInjector {
    configs: BTreeMap<String, AuthConfig>,
    secrets: Arc<dyn SecretsProvider>,
}

impl StaticAuthInjector {
    pub fn new(configs: BTreeMap<String, AuthConfig>, secrets: Arc<dyn SecretsProvider>) -> Self {
        Self { configs, secrets }
    }

    /// Accepts JSON or YAML: a map from config id to [`AuthConfig`].
    pub fn load_str(input: &str, secrets: Arc<dyn SecretsProvider>) -> Result<Self, AuthError> {
        let configs = serde_yaml::from_str(input).map_err(|e| AuthError::Load(e.to_string()))?;
        Ok(Self::new(configs, secrets))
    }

    pub fn from_path(path: &Path, secrets: Arc<dyn SecretsProvider>) -> Result<Self, AuthError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Load(format!("{}: {e}", path.display())))?;
        Self::load_str(&input, secrets)
    }

    async fn resolve(&self, raw: &str) -> Result<String, AuthError> {
        match SecretRef::parse(raw) {
            Ok(r) if r.scheme == SECRET_SCHEME => Ok(self.secrets.get(&r).await?.expose().to_string()),
            _ => Ok(raw.to_string()),
        }
    }
}

#[async_trait]
impl AuthInjector for StaticAuthInjector {
    async fn inject(&self, auth_ref: &str, mut request: ApiRequest) -> Result<ApiRequest, AuthError> {
        let config = self
            .configs
            .get(auth_ref)
            .ok_or_else(|| AuthError::NotFound(auth_ref.to_string()))?;

        match config {
            AuthConfig::Bearer { token } => {
                let token = self.resolve(token).await?;
                request.set_header("Authorization", format!("Bearer {token}"));
            }
            AuthConfig::Basic { username, password } => {
                let username = self.resolve(username).await?;
                let password = self.resolve(password).await?;
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                request.set_header("Authorization", format!("Basic {encoded}"));
            }
            AuthConfig::ApiKey { name, value, location } => {
                let value = self.resolve(value).await?;
                match location {
                    ApiKeyLocation::Header => request.set_header(name, value),
                    ApiKeyLocation::Query => match &mut request {
                        ApiRequest::Rest(r) => {
                            r.query_params.insert(name.clone(), value);
                        }
                        other => {
                            return Err(AuthError::Unsupported(format!(
                                "apiKey in query is not supported for {} requests",
                                other.protocol()
                            )));
                        }
                    },
                }
            }
        }
        tracing::debug!(auth_ref, "credentials injected");
        Ok(request)
    }

    fn sensitive_fields(&self, auth_ref: &str) -> Vec<String> {
        self.configs
            .get(auth_ref)
            .map(AuthConfig::sensitive_fields)
            .unwrap_or_default()
    }
}
