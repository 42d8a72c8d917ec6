//! CLI command definitions for the `clqy` binary.
//!
//! Uses clap derive macros for argument parsing. Everything except
//! `serve` is a local administrative command against the same database.

pub mod admin;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Colloquy conversational backend.
#[derive(Parser)]
#[command(name = "clqy", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "7171")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Export spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Create an admin account (password prompted).
    CreateAdmin {
        /// Admin email address.
        #[arg(long)]
        email: String,

        /// Display name.
        #[arg(long)]
        name: String,
    },

    /// System status dashboard.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
