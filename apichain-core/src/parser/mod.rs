use crate::error::ParseError;
use crate::types::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedWorkflow {
    pub workflow: Workflow,
    pub format: DocumentFormat,
}

pub fn parse_workflow_str(input: &str, format: DocumentFormat) -> Result<ParsedWorkflow, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedWorkflow {
            workflow: serde_json::from_str::<Workflow>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedWorkflow {
            workflow: serde_yaml::from_str::<Workflow>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_workflow_auto(input),
    }
}

fn parse_workflow_auto(input: &str) -> Result<ParsedWorkflow, ParseError> {
    // JSON always starts with `{` after trimming; YAML is a superset, so it is the fallback.
    if input.trim_start().starts_with('{') {
        return match serde_json::from_str::<Workflow>(input) {
            Ok(workflow) => Ok(ParsedWorkflow {
                workflow,
                format: DocumentFormat::Json,
            }),
            Err(e) => match serde_yaml::from_str::<Workflow>(input) {
                Ok(workflow) => Ok(ParsedWorkflow {
                    workflow,
                    format: DocumentFormat::Yaml,
                }),
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match serde_yaml::from_str::<Workflow>(input) {
        Ok(workflow) => Ok(ParsedWorkflow {
            workflow,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => {
            if let Ok(workflow) = serde_json::from_str::<Workflow>(input) {
                return Ok(ParsedWorkflow {
                    workflow,
                    format: DocumentFormat::Json,
                });
            }
            Err(ParseError::Yaml(e))
        }
    }
}
