//! CLI entry point for the Starknet position indexer.
//!
//! # Architecture Flow
//!
//! ```text
//! main.rs (Runtime Initialization)
//!     ↓
//! CLI Layer (src/cli.rs)
//!     ↓
//! 1. Config Layer (src/config.rs)      → Load environment variables
//! 2. RPC Layer (src/rpc.rs)            → Create Starknet JSON-RPC client
//! 3. Events Layer (src/events/)        → Fetch & decode Mint events
//! 4. Position Layer (src/position.rs)  → Read current position state
//! 5. Output Layer (src/output.rs)      → Join & write combined_output.json
//! ```
//!
//! All errors bubble up via `IndexerResult<T>`; any error exits with status 1.

use starknet_position_indexer::{cli, observability};
use tracing::error;

#[tokio::main]
async fn main() {
    // Logging is configured from the environment (and .env):
    // - RUST_LOG: filter directives (e.g. "debug")
    // - LOG_JSON: JSON console output ("true" or "false")
    // - LOG_FILE: additional daily-rotated JSON log file
    let settings = observability::LogSettings::from_env();

    let _guard = match observability::init_tracing(settings.level, settings.file, settings.json) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::run().await {
        error!(error = %e, "Application error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
