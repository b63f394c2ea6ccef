//! Credential injection. Handlers never see credentials; the step executor hands each
//! request with an `authConfigId` to an [`AuthInjector`] before dispatch.

mod config;
mod injector;

pub use config::{ApiKeyLocation, AuthConfig};
pub use injector::{AuthInjector, NoAuth, StaticAuthInjector};

use crate::secrets::SecretError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no auth config named `{0}`")]
    NotFound(String),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error("{0}")]
    Unsupported(String),
    #[error("failed to load auth configs: {0}")]
    Load(String),
}
