use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Per-request timeout; an expired request becomes a failed response.
    pub request_timeout: Duration,
    pub max_response_bytes: usize,
    /// Prefix for relative REST and GraphQL endpoints.
    pub base_url: Option<String>,
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 10 * 1024 * 1024,
            base_url: None,
            user_agent: concat!("apichain/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
