use crate::report::{
    run_insights, run_press_release, run_statistics, InsightsArgs, PressReleaseArgs,
    StatisticsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use cpi_report::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "cpi-report",
    about = "Consumer price index statistics, upload insights and press releases",
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
    /// Compute a statistics preset from a price-index workbook and print JSON
    Statistics(StatisticsArgs),
    /// Write the DOCX press release for a price-index workbook
    PressRelease(PressReleaseArgs),
    /// Extract insights from any spreadsheet and print the text press release
    Insights(InsightsArgs),
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
        Command::Statistics(args) => run_statistics(args),
        Command::PressRelease(args) => run_press_release(args),
        Command::Insights(args) => run_insights(args),
    }
}
