use crate::commands::{run_predict, run_scan, run_score, PredictArgs, ScanArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use nutriscan::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Nutrition Scanner",
    about = "Score packaged food by barcode and run the nutrient classifier from the command line",
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
    /// Run the trained classifier over four nutrient values
    Predict(PredictArgs),
    /// Apply the rule-based health score to a nutriments JSON file
    Score(ScoreArgs),
    /// Look a barcode up on OpenFoodFacts and print the full scan report
    Scan(ScanArgs),
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
        Command::Predict(args) => run_predict(args),
        Command::Score(args) => run_score(args),
        Command::Scan(args) => run_scan(args).await,
    }
}
