use crate::batch::{run_compute, ComputeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scheme_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Scheme Engine",
    about = "Recompute loan scheme exports from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Recompute every row of a scheme CSV export
    Compute(ComputeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Compute(args) => run_compute(args),
    }
}
