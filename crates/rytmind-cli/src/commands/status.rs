//! Status command implementation

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use rytmind_core::stats::spending_by_category;
use rytmind_core::window::{month_start_millis, to_millis};

use super::open_db;

pub fn cmd_status(db_path: &Path) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 RytMind Status");
    println!("   ─────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let db = open_db(db_path)?;
    let counts = db.counts()?;

    println!();
    println!("   Transactions: {}", counts.transactions);
    println!("   Journal entries: {}", counts.journal_entries);
    println!("   Insights: {}", counts.insights);
    println!("   Chat messages: {}", counts.chat_messages);

    let now = Utc::now();
    let transactions = db.transactions_in_range(month_start_millis(now), to_millis(now))?;
    let spending = spending_by_category(&transactions);

    if spending.is_empty() {
        println!();
        println!("   No spending recorded this month.");
    } else {
        let mut entries: Vec<(&String, &f64)> = spending.iter().collect();
        entries.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
        let total: f64 = spending.values().sum();

        println!();
        println!("   💸 This month: RM {:.2}", total);
        for (category, amount) in entries {
            println!("      {:<14} RM {:.2}", category, amount);
        }
    }

    println!();
    Ok(())
}
