//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_seed` - Populate the database with demo data

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rytmind_core::db::Database;
use rytmind_core::seed::seed_demo_data;

/// Open the database, creating it and running migrations if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Seed demo data: rytmind seed --days 30");
    println!("  2. Start the server: rytmind serve");

    Ok(())
}

pub fn cmd_seed(db_path: &Path, days: u32, seed: u64) -> Result<()> {
    println!("🌱 Seeding {} days of demo data...", days);

    let db = open_db(db_path)?;
    let summary = seed_demo_data(&db, days, seed, Utc::now())?;

    if summary.skipped {
        println!("⏭️  Store already has transactions; nothing was written.");
        println!("   Use a fresh database to reseed.");
        return Ok(());
    }

    println!("   Transactions: {}", summary.transactions);
    println!("   Journal entries: {}", summary.journal_entries);
    println!("✅ Demo data seeded.");
    println!();
    println!("Try: rytmind status");

    Ok(())
}
