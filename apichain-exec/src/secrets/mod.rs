//! Secret references (`secrets://NAME`) used by auth configs, and header redaction.

mod provider;
mod redact;
mod r#ref;
mod value;

pub use provider::{EnvSecretsProvider, SecretError, SecretsProvider};
pub use redact::{redact_headers, redact_request, REDACTED};
pub use r#ref::{SecretRef, SecretRefParseError};
pub use value::SecretValue;
