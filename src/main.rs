//! One-shot PostgreSQL cluster backup: dump, compress, upload, delete.
//!
//! Scheduling is external (cron or similar); each invocation performs exactly
//! one run and exits with a code reflecting the explicit run result.

// pgvault/src/main.rs
mod backup;
mod config;
mod errors;

use std::process::ExitCode;

use config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    println!("🚀 Initiating DB backup...");

    let app_config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    match backup::run_backup(&app_config).await {
        Ok(outcome) => {
            if let backup::CleanupStatus::LeftBehind(reason) = &outcome.local_file {
                eprintln!("⚠️ Local dump file left behind: {reason}");
            }
            println!("✅ Backup complete: {}", outcome.object_name);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Backup failed: {e}");
            ExitCode::FAILURE
        }
    }
}
