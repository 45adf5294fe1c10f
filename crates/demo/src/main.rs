//! Demo entry point.

use std::process::ExitCode;

use demo::Config;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match demo::run(&config).await {
        Ok(entity) => {
            println!("{} ({}) is named {}", entity.id, entity.version, entity.name);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "scenario failed");
            ExitCode::FAILURE
        }
    }
}
