#![forbid(unsafe_code)]

//! Workflow model, parsing, validation and variable resolution for apichain.
//!
//! Nothing in this crate touches the network; request execution lives in `apichain-exec`.

pub mod error;
pub mod expressions;
pub mod parser;
pub mod resolve;
pub mod types;
pub mod validate;
pub mod variables;

pub use crate::error::{ApichainError, ErrorKind, ParseError, ValidationError, Violation};
pub use crate::expressions::{extract, ExtractionError};
pub use crate::parser::{parse_workflow_str, DocumentFormat, ParsedWorkflow};
pub use crate::resolve::{substitute, Substitution, SubstitutionError, UnresolvedToken};
pub use crate::types::{
    ApiRequest, Assertion, GraphQlRequest, GrpcRequest, RestRequest, Step, UnsupportedRequest,
    VariableMapping, Workflow,
};
pub use crate::validate::{validate_workflow, Validate};
pub use crate::variables::VariableBag;
