use std::path::Path;

use apichain_core::validate_workflow;
use apichain_store::{NewWorkflow, WorkflowStore};
use serde::Serialize;

use super::common::{connect_store, load_workflow};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
struct SaveResult {
    id: String,
    name: String,
    steps: usize,
}

pub async fn save_cmd(path: &Path, owner: Option<String>, store: StoreArgs, output: OutputArgs) -> i32 {
    let parsed = match load_workflow(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    if let Err(err) = validate_workflow(&parsed.workflow) {
        for v in &err.violations {
            print_error(output.format, output.quiet, &v.to_string());
        }
        return exit_codes::VALIDATION_FAILED;
    }

    let pg = match connect_store(&store, &output).await {
        Ok(pg) => pg,
        Err(code) => return code,
    };

    match pg
        .save_workflow(NewWorkflow {
            owner,
            workflow: parsed.workflow,
        })
        .await
    {
        Ok(saved) => {
            let result = SaveResult {
                id: saved.id.to_string(),
                name: saved.workflow.name.clone(),
                steps: saved.workflow.steps.len(),
            };
            if output.format == OutputFormat::Text && !output.quiet {
                println!("{}", result.id);
            } else {
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to save workflow: {e}"));
            exit_codes::RUNTIME_ERROR
        }
    }
}
