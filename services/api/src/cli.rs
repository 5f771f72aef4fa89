use crate::report::{run_criteria, run_report, run_score, ReportArgs, ScoreArgs};
use crate::server;
use arc_directory::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ARC Directory",
    about = "Score and list service providers by their support for ARC holders",
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
    /// Score one set of criterion selections
    Score(ScoreArgs),
    /// Print the criterion catalog
    Criteria,
    /// Import a provider CSV export and print the graded directory
    Report(ReportArgs),
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
        Command::Criteria => {
            run_criteria();
            Ok(())
        }
        Command::Report(args) => run_report(args),
    }
}
