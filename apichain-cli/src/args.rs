use std::path::PathBuf;
use std::time::Duration;

use apichain_exec::ExecutorConfig;
use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    /// Postgres URL; falls back to APICHAIN_DATABASE_URL, then DATABASE_URL.
    #[arg(long)]
    pub store: Option<String>,
    #[arg(long, default_value_t = 5)]
    pub max_connections: u32,
}

impl StoreArgs {
    pub fn database_url(&self) -> Option<String> {
        self.store
            .clone()
            .or_else(|| std::env::var("APICHAIN_DATABASE_URL").ok())
            .or_else(|| std::env::var("DATABASE_URL").ok())
    }
}

#[derive(Debug, Args, Clone)]
pub struct ExecArgs {
    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    pub max_response_bytes: usize,
    /// Prefix for relative REST and GraphQL endpoints.
    #[arg(long)]
    pub base_url: Option<String>,
}

impl ExecArgs {
    pub fn to_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            request_timeout: Duration::from_millis(self.timeout),
            max_response_bytes: self.max_response_bytes,
            base_url: self.base_url.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct AuthArgs {
    /// JSON/YAML map of auth config id to config; values may be secrets://ENV_VAR.
    #[arg(long)]
    pub auth: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventsMode {
    None,
    Stdout,
    Store,
}
