use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "apichain", version, about = "Run multi-step REST, GraphQL and gRPC workflows")]
struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            path,
            id,
            events,
            exec,
            auth,
            store,
            output,
        } => cmd::run::run_cmd(path.as_deref(), id.as_deref(), events, exec, auth, store, output).await,
        Command::Validate { path, output } => cmd::validate::validate_cmd(&path, output).await,
        Command::Save {
            path,
            owner,
            store,
            output,
        } => cmd::save::save_cmd(&path, owner, store, output).await,
        Command::History {
            run_id,
            store,
            output,
        } => cmd::history::history_cmd(&run_id, store, output).await,
        Command::Migrate { store, output } => cmd::migrate::migrate_cmd(store, output).await,
    }
}
