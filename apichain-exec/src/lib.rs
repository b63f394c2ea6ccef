#![forbid(unsafe_code)]

//! Runtime for apichain workflows: protocol handlers, auth injection, the step
//! executor and the workflow engine.
//!
//! Parsing and validation live in `apichain-core`; persistence in `apichain-store`.

pub mod assertions;
pub mod auth;
pub mod config;
pub mod engine;
pub mod events;
pub mod history;
pub mod http;
pub mod protocol;
pub mod response;
pub mod secrets;
pub mod step;

pub use crate::assertions::AssertionOutcome;
pub use crate::auth::{AuthConfig, AuthError, AuthInjector, NoAuth, StaticAuthInjector};
pub use crate::config::ExecutorConfig;
pub use crate::engine::{Engine, EngineError, RunContext, RunStatus, WorkflowResult};
pub use crate::events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, StoreEventSink,
};
pub use crate::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use crate::protocol::{
    GraphQlHandler, GrpcHandler, HandlerRegistry, ProtocolError, ProtocolHandler, RestHandler,
};
pub use crate::response::NormalizedResponse;
pub use crate::step::{RunScope, StepExecutor, StepResult};
