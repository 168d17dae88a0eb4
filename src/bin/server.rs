use anyhow::Result;
use clap::Parser;
use cotacao::AppConfig;
use cotacao::core::log::init_logging;

/// Serves the current USD/BRL bid on GET /cotacao
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
        Ok(config) => cotacao::server::run(&config.server).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Server failed");
    }
    result
}
