use uuid::Uuid;

use super::common::connect_store;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

pub async fn history_cmd(run_id: &str, store: StoreArgs, output: OutputArgs) -> i32 {
    let run_id = match Uuid::parse_str(run_id) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("invalid run id: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let pg = match connect_store(&store, &output).await {
        Ok(pg) => pg,
        Err(code) => return code,
    };

    let entries = match pg.history_for_run(run_id).await {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to load history: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if output.format == OutputFormat::Text && !output.quiet {
        if entries.is_empty() {
            println!("no history for run {run_id}");
        }
        for e in &entries {
            let status = e.response.get("statusCode").and_then(|s| s.as_u64()).unwrap_or(0);
            println!(
                "{:>4}  {:<4} {:<24} {:>3}  {:>6}ms  {}",
                e.step_order,
                if e.success { "ok" } else { "FAIL" },
                e.step_name,
                status,
                e.duration_ms,
                e.recorded_at.to_rfc3339()
            );
        }
    } else {
        print_result(output.format, output.quiet, &entries);
    }
    exit_codes::SUCCESS
}
