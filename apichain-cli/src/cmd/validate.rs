use std::path::Path;

use apichain_core::validate_workflow;
use serde::Serialize;

use super::common::load_workflow;
use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    format: String,
    steps: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match load_workflow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let errors: Vec<String> = match validate_workflow(&parsed.workflow) {
        Ok(()) => Vec::new(),
        Err(err) => err.violations.iter().map(ToString::to_string).collect(),
    };
    let result = ValidateResult {
        valid: errors.is_empty(),
        format: format!("{:?}", parsed.format),
        steps: parsed.workflow.steps.len(),
        errors,
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if result.valid {
            println!(
                "ok: `{}` is valid ({} steps, {})",
                parsed.workflow.name, result.steps, result.format
            );
        } else {
            eprintln!("error: validation failed");
            for e in &result.errors {
                eprintln!("- {e}");
            }
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if result.valid {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    }
}
