use crate::demo::{run_demo, run_rank, run_score, DemoArgs, RankArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fitscore::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "fitscore",
    about = "Score fitness assessments and rank results against normative data",
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
    /// Score an assessment submission from a JSON file and print the report
    Score(ScoreArgs),
    /// Rank a single score against the normative table
    Rank(RankArgs),
    /// Walk a demo client through two visits, an override and a progress report
    Demo(DemoArgs),
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
        Command::Score(args) => run_score(args),
        Command::Rank(args) => run_rank(args),
        Command::Demo(args) => run_demo(args),
    }
}
