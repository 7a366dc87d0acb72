//! Stash shell - drive the CACHE classes from the command line
//!
//! Reads one command per line from stdin. Run `HELP` for the command list.

use std::io::{self, IsTerminal};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stash::{ClassRegistry, Config, Shell};

/// Main entry point for the stash shell.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging (to stderr)
/// 2. Load configuration from environment variables
/// 3. Build the CACHE class registry
/// 4. Run the command loop until end of input or QUIT
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stash=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_capacity={}, default_ttl={}s",
        config.default_capacity, config.default_ttl
    );

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut shell = Shell::new(ClassRegistry::new(), config);
    shell.run(stdin.lock(), io::stdout().lock(), interactive)?;

    Ok(())
}
