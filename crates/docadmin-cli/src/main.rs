//! DocAdmin console entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::Cli;
use docadmin_core::config::LoggingConfig;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match commands::load_config(&cli.env) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);

    if let Err(e) = cli.execute(config).await {
        output::print_error(&e.user_message());
        tracing::debug!(error = %e, "Command failed");
        std::process::exit(1);
    }
}
