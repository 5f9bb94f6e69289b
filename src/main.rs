use clap::Parser;

use round_robin_lb::config::Cli;
use round_robin_lb::lifecycle::startup;
use round_robin_lb::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    tracing::info!("round-robin-lb v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        port = config.listener.port,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        max_retries = config.retries.max_retries,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
