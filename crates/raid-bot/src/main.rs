//! Raid bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p raid-bot
//! ```
//!
//! Configuration is loaded from config files and `RAIDBOT__*` environment
//! variables.

use raid_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = config.app.env.as_str(),
        address = %config.server.address(),
        store = ?config.store.backend,
        "Configuration loaded"
    );

    if let Err(e) = raid_bot::run(config).await {
        error!(error = %e, "Raid bot stopped with an error");
        std::process::exit(1);
    }
}
