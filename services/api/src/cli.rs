use crate::demo::{run_demo, run_penalty_estimate, run_ranking, PenaltyEstimateArgs, RankingArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use site_audit::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Site Audit Scoring",
    about = "Serve and run the site-audit conformity and penalty engine from the command line",
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
    /// Estimate regulatory penalties for a single evaluation
    Penalty {
        #[command(subcommand)]
        command: PenaltyCommand,
    },
    /// Print the site conformity leaderboard for a set of evaluations
    Ranking(RankingArgs),
    /// Run both computations over built-in sample audits
    Demo,
}

#[derive(Subcommand, Debug)]
enum PenaltyCommand {
    /// Price an evaluation's non-conformities against a penalty table
    Estimate(PenaltyEstimateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Penalty table CSV (defaults to the bundled reference table)
    #[arg(long)]
    pub(crate) penalty_table: Option<PathBuf>,
    /// JSON array of evaluations to serve (defaults to the demo audits)
    #[arg(long)]
    pub(crate) evaluations: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Penalty {
            command: PenaltyCommand::Estimate(args),
        } => run_penalty_estimate(args),
        Command::Ranking(args) => run_ranking(args),
        Command::Demo => run_demo(),
    }
}
