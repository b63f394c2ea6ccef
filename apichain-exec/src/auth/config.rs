/// One entry of the auth config file. Any string field may be a `secrets://NAME` reference.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthConfig {
    Bearer {
        token: String,
    },
    ApiKey {
        name: String,
        value: String,
        #[serde(rename = "in", default)]
        location: ApiKeyLocation,
    },
    Basic {
        username: String,
        password: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

impl AuthConfig {
    /// Header or query parameter names whose values must be masked.
    pub fn sensitive_fields(&self) -> Vec<String> {
        match self {
            AuthConfig::ApiKey { name, .. } => vec![name.clone()],
            AuthConfig::Bearer { .. } | AuthConfig::Basic { .. } => Vec::new(),
        }
    }
}
