mod assertion;
mod request;
mod step;
mod workflow;

pub use assertion::Assertion;
pub use request::{ApiRequest, GraphQlRequest, GrpcRequest, RestRequest, UnsupportedRequest};
pub use step::{Step, VariableMapping};
pub use workflow::Workflow;

pub type Headers = std::collections::BTreeMap<String, String>;
