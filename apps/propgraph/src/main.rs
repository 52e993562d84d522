//! # propgraph
//!
//! Operator binary for propgraph snapshot directories.
//!
//! ## Usage
//!
//! ```bash
//! propgraph --dir ./data init
//! propgraph --dir ./data add-vertex --id 1
//! propgraph --dir ./data set vertex 1 name marko
//! propgraph --dir ./data lookup vertices name marko
//! propgraph --dir ./data --json-mode status
//! ```

use clap::Parser;
use propgraph::cli::{self, Cli};
use propgraph::{AppConfig, LogConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = Cli::parse();

    // Logging is not up yet, so a bad config file goes straight to stderr.
    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_env_overrides(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    init_tracing(&config.log, cli.verbose);

    if let Err(e) = cli::execute(cli, &config) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogConfig, verbose: bool) {
    let fallback = if verbose {
        "propgraph=debug,propgraph_core=debug"
    } else {
        log.filter.as_str()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| fallback.into());

    // Logs go to stderr so JSON command output on stdout stays parseable.
    match log.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
