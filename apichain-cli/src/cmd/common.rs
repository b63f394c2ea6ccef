use std::path::Path;

use apichain_core::{parse_workflow_str, DocumentFormat, ParseError, ParsedWorkflow};
use apichain_store::PostgresStore;

use crate::exit_codes;
use crate::output::{print_error, redact_url_password};
use crate::{OutputArgs, StoreArgs};

/// Reads and parses a workflow file; on failure prints the error and returns the exit code.
pub fn load_workflow(path: &Path, output: &OutputArgs) -> Result<ParsedWorkflow, i32> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        exit_codes::RUNTIME_ERROR
    })?;

    parse_workflow_str(&content, DocumentFormat::Auto).map_err(|e| {
        let message = match e {
            ParseError::Json(e) => format!("JSON parse failed: {e}"),
            ParseError::Yaml(e) => format!("YAML parse failed: {e}"),
        };
        print_error(output.format, output.quiet, &message);
        exit_codes::VALIDATION_FAILED
    })
}

pub async fn connect_store(store: &StoreArgs, output: &OutputArgs) -> Result<PostgresStore, i32> {
    let Some(database_url) = store.database_url() else {
        print_error(
            output.format,
            output.quiet,
            "missing database url (use --store or set APICHAIN_DATABASE_URL / DATABASE_URL)",
        );
        return Err(exit_codes::RUNTIME_ERROR);
    };

    PostgresStore::connect(&database_url, store.max_connections)
        .await
        .map_err(|e| {
            print_error(
                output.format,
                output.quiet,
                &format!(
                    "failed to connect to {}: {e}",
                    redact_url_password(&database_url)
                ),
            );
            exit_codes::RUNTIME_ERROR
        })
}
