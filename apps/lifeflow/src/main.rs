//! # LifeFlow - Blood Donor Matching
//!
//! The main binary for LifeFlow.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for registry operations
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              apps/lifeflow                   │
//! │                                              │
//! │   ┌─────────────┐        ┌─────────────┐     │
//! │   │   CLI       │        │   HTTP API  │     │
//! │   │  (clap)     │        │   (axum)    │     │
//! │   └──────┬──────┘        └──────┬──────┘     │
//! │          └───────────┬──────────┘            │
//! │                      ▼                       │
//! │              ┌───────────────┐               │
//! │              │ lifeflow-core │               │
//! │              └───────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! lifeflow server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! lifeflow compat O-
//! lifeflow register -f donor.json
//! lifeflow search -t B+ --city Pune --compatible
//! lifeflow emergency -f request.json
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // LIFEFLOW_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LIFEFLOW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lifeflow=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = lifeflow::cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = lifeflow::cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the LifeFlow startup banner.
fn print_banner() {
    println!(
        r#"
  LifeFlow v{}
  Every drop counts. Find compatible donors fast.
"#,
        env!("CARGO_PKG_VERSION")
    );
}
