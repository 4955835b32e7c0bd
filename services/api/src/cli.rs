use crate::evaluate::{run_evaluate, run_thresholds, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use oala::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "OALA Self-Assessment",
    about = "Run the old age living allowance means-test service or evaluate declarations offline",
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
    /// Evaluate a declaration file and print the means-test outcome
    Evaluate(EvaluateArgs),
    /// Print the active threshold table as JSON
    Thresholds,
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
        Command::Evaluate(args) => run_evaluate(args),
        Command::Thresholds => run_thresholds(),
    }
}
