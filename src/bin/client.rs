use anyhow::Result;
use clap::Parser;
use cotacao::AppConfig;
use cotacao::core::log::init_logging;

/// Fetches the current USD/BRL bid from the rate server and saves it
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match AppConfig::load(cli.config_path.as_deref()) {
        Ok(config) => cotacao::client::fetch_and_save(&config.client).await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(path) => println!("File saved successfully: {}", path.display()),
        Err(e) => tracing::error!(error = %e, "Client failed"),
    }
    result.map(|_| ())
}
