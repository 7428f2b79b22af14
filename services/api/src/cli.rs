use crate::demo::{run_demo, run_match, DemoArgs, MatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use housing_allocation::config::AppConfig;
use housing_allocation::error::AppError;
use housing_allocation::telemetry::{self, LogTarget};

#[derive(Parser, Debug)]
#[command(
    name = "Housing Allocation",
    about = "Run the housing program allocation service or exercise the matcher from the command line",
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
    /// Walk sample requests through intake, matching and confirmation
    Demo(DemoArgs),
    /// Rank the inventory against an ad-hoc request
    Match(MatchArgs),
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
        Command::Demo(args) => {
            cli_config()?;
            run_demo(args)
        }
        Command::Match(args) => {
            let config = cli_config()?;
            run_match(args, &config)
        }
    }
}

fn cli_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogTarget::Cli)?;
    Ok(config)
}
