use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod browser;
mod extract;
mod normalize;
mod output;
mod record;
mod scrape;
mod telemetry;

#[derive(Parser)]
#[command(name = "listings", about = "Scrape shadow-DOM property listings into an ACF import table")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Scrape(scrape::ScrapeCmd),
    Normalize(normalize::NormalizeCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logging goes to stderr. Respects RUST_LOG and LISTINGS_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Scrape(args) => scrape::run(args).await?,
        Commands::Normalize(args) => normalize::run(args)?,
    }

    Ok(())
}
