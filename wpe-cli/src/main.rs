//! wpe - explore historical weather probabilities from the command line.

use clap::Parser;
use log::debug;
use wpe_cmd::Config;

#[derive(Parser)]
#[command(
    name = "wpe",
    version,
    about = "Historical weather probabilities for any place and day of year"
)]
struct Cli {
    /// Backend base URL; overrides WPE_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: wpe_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env()?.with_api_url(cli.api_url);
    debug!("Using backend {}", config.api_url);
    wpe_cmd::run(&config, cli.command).await
}
