use crate::types::{ApiRequest, Assertion};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub order: i64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "apiRequest")]
    pub api_request: ApiRequest,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "variableMappings")]
    pub variable_mappings: Vec<VariableMapping>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,

    #[serde(default)]
    #[serde(rename = "continueOnFailure")]
    pub continue_on_failure: bool,

    /// Opaque reference handed to the auth collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "authConfigId")]
    pub auth_config_id: Option<String>,
}

/// Binds a value from a step's response body to a variable name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariableMapping {
    /// 0-based position of the source step in the execution sequence.
    #[serde(rename = "sourceStep")]
    pub source_step: usize,

    #[serde(rename = "sourcePath")]
    pub source_path: String,

    #[serde(rename = "targetVariable")]
    pub target_variable: String,
}
