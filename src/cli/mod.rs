//! Command-line interface for Quire.

mod commands;

use clap::{Parser, Subcommand};

/// Quire - content backend for section-based sites
#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Delete expired personal access tokens
    #[command(alias = "prune")]
    PruneTokens,
}

pub use commands::*;
