//! Web server command implementation

use std::path::Path;

use anyhow::Result;

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16) -> Result<()> {
    let db = open_db(db_path)?;

    println!("🚀 Starting RytMind server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening on http://{}:{}", host, port);
    println!();
    println!("   API base: http://{}:{}/api", host, port);
    println!("   Health check: http://{}:{}/health", host, port);

    rytmind_server::serve(db, host, port).await
}
