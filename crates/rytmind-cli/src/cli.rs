//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// RytMind - Mindful money companion
#[derive(Parser)]
#[command(name = "rytmind")]
#[command(about = "Self-hosted personal finance companion with AI budgeting", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "rytmind.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Seed the database with demo transactions and journal entries
    Seed {
        /// Number of days of history to generate
        #[arg(short, long, default_value = "30")]
        days: u32,

        /// PRNG seed; the same seed always produces the same data
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Show database status and current-month spending
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
