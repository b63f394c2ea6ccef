mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::Workflow;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for Workflow {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_workflow(self)
    }
}

/// Structural checks that must pass before a run starts.
///
/// Request contents are not inspected here: a malformed request only fails its own step.
pub fn validate_workflow(workflow: &Workflow) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_workflow(workflow);
    v.finish()
}
