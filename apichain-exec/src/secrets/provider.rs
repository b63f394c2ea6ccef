use async_trait::async_trait;

use crate::secrets::{SecretRef, SecretValue};

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret not found: {0}")]
    NotFound(SecretRef),
    #[error("secret provider error for {secret_ref}: {message}")]
    Provider { secret_ref: SecretRef, message: String },
}

#[async_trait]
pub trait SecretsProvider: Send + Sync {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError>;
}

/// Resolves `secrets://NAME` from the process environment.
#[derive(Debug, Clone)]
pub struct EnvSecretsProvider {
    pub scheme: String,
    /// Prepended to the id before lookup, e.g. `APICHAIN_SECRET_`.
    pub env_prefix: Option<String>,
}

impl Default for EnvSecretsProvider {
    fn default() -> Self {
        Self {
            scheme: "secrets".to_string(),
            env_prefix: None,
        }
    }
}

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError> {
        if secret_ref.scheme != self.scheme {
            return Err(SecretError::NotFound(secret_ref.clone()));
        }
        let key = match &self.env_prefix {
            None => secret_ref.id.clone(),
            Some(p) => format!("{p}{}", secret_ref.id),
        };
        match std::env::var(&key) {
            Ok(v) => Ok(SecretValue::new(v)),
            Err(std::env::VarError::NotPresent) => Err(SecretError::NotFound(secret_ref.clone())),
            Err(e) => Err(SecretError::Provider {
                secret_ref: secret_ref.clone(),
                message: e.to_string(),
            }),
        }
    }
}
