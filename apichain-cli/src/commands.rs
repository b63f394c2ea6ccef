use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a workflow file, or a stored workflow with --id.
    Run {
        #[arg(required_unless_present = "id", conflicts_with = "id")]
        path: Option<PathBuf>,
        #[arg(long)]
        id: Option<String>,
        #[arg(long, value_enum, default_value_t = EventsMode::None)]
        events: EventsMode,
        #[command(flatten)]
        exec: ExecArgs,
        #[command(flatten)]
        auth: AuthArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse and structurally validate a workflow file.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Store a workflow and print its id.
    Save {
        path: PathBuf,
        #[arg(long)]
        owner: Option<String>,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the recorded step history of a run.
    History {
        run_id: String,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply database migrations.
    Migrate {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
