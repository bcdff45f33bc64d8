//! # LifeFlow CLI Module
//!
//! This module implements the CLI interface for LifeFlow.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show registry counts
//! - `init` - Initialize a new database
//! - `compat` - Show compatible donors and recipients for a blood type
//! - `blood-types` - List blood type profiles
//! - `register` - Register a donor from a JSON file
//! - `donor` - Show one donor
//! - `search` - Search eligible donors
//! - `donate` - Record a donation
//! - `emergency` - Create an emergency request from a JSON file
//! - `requests` - List emergency requests
//! - `resolve` - Mark an emergency request fulfilled
//! - `hospitals` - Search the hospital directory

mod commands;

use crate::config::{AppConfig, Backend};
use clap::{Parser, Subcommand};
use lifeflow_core::LifeFlowError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// LifeFlow - blood donor matching
///
/// Donor registry, blood type compatibility, and emergency broadcasts.
#[derive(Parser, Debug)]
#[command(name = "lifeflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./lifeflow.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the registry database (overrides config)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "file" (snapshot file)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<Backend>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show registry counts
    Status,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show compatible donors and recipients for a blood type
    Compat {
        /// Blood type code, e.g. "O-" or "AB+"
        #[arg(allow_hyphen_values = true)]
        blood_type: String,
    },

    /// List all blood type profiles
    BloodTypes,

    /// Register a donor from a JSON file
    Register {
        /// Path to the donor JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show one donor
    Donor {
        /// Donor ID
        id: u64,
    },

    /// Search eligible donors
    Search {
        /// Recipient blood type code
        #[arg(short = 't', long, allow_hyphen_values = true)]
        blood_type: String,

        /// City (case-insensitive substring)
        #[arg(long)]
        city: Option<String>,

        /// State (case-insensitive)
        #[arg(long)]
        state: Option<String>,

        /// Include every compatible donor type, not only the exact type
        #[arg(long)]
        compatible: bool,

        /// Only donors who opted into emergency alerts
        #[arg(long)]
        emergency_only: bool,

        /// Maximum results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Record a donation for a donor
    Donate {
        /// Donor ID
        id: u64,
    },

    /// Create an emergency request from a JSON file and list donors to alert
    Emergency {
        /// Path to the request JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List emergency requests
    Requests {
        /// Include fulfilled requests
        #[arg(short, long)]
        all: bool,
    },

    /// Mark an emergency request fulfilled
    Resolve {
        /// Request ID
        id: u64,
    },

    /// Search the hospital directory
    Hospitals {
        /// Search term (at least 2 characters)
        term: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve the effective config: file, then environment, then CLI flags.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig, LifeFlowError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.storage.database = database.clone();
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), LifeFlowError> {
    let mut config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;
    let storage = &config.storage;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(&config).await
        }
        Some(Commands::Status) => cmd_status(storage, json_mode),
        Some(Commands::Init { force }) => cmd_init(storage, force),
        Some(Commands::Compat { blood_type }) => cmd_compat(&blood_type, json_mode),
        Some(Commands::BloodTypes) => cmd_blood_types(json_mode),
        Some(Commands::Register { file }) => cmd_register(storage, json_mode, &file),
        Some(Commands::Donor { id }) => cmd_donor(storage, json_mode, id),
        Some(Commands::Search {
            blood_type,
            city,
            state,
            compatible,
            emergency_only,
            limit,
        }) => cmd_search(
            storage,
            json_mode,
            SearchArgs {
                blood_type,
                city,
                state,
                compatible,
                emergency_only,
                limit,
            },
        ),
        Some(Commands::Donate { id }) => cmd_donate(storage, json_mode, id),
        Some(Commands::Emergency { file }) => cmd_emergency(storage, json_mode, &file),
        Some(Commands::Requests { all }) => cmd_requests(storage, json_mode, all),
        Some(Commands::Resolve { id }) => cmd_resolve(storage, json_mode, id),
        Some(Commands::Hospitals { term }) => cmd_hospitals(&term, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(storage, json_mode)
        }
    }
}
