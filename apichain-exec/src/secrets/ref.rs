use std::fmt;

/// `scheme://id`, e.g. `secrets://GITHUB_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretRef {
    pub scheme: String,
    pub id: String,
}

impl SecretRef {
    pub fn parse(input: &str) -> Result<Self, SecretRefParseError> {
        let (scheme, id) = input
            .trim()
            .split_once("://")
            .ok_or(SecretRefParseError::MissingScheme)?;
        if !is_valid_scheme(scheme) {
            return Err(SecretRefParseError::InvalidScheme(scheme.to_string()));
        }
        if id.is_empty() {
            return Err(SecretRefParseError::EmptyId);
        }
        Ok(Self {
            scheme: scheme.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // An identifier, never the value.
        write!(f, "{}://{}", self.scheme, self.id)
    }
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SecretRefParseError {
    #[error("secret reference must look like secrets://NAME")]
    MissingScheme,
    #[error("invalid secret reference scheme: {0:?}")]
    InvalidScheme(String),
    #[error("secret reference id must not be empty")]
    EmptyId,
}
