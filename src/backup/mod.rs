// pgvault/src/backup/mod.rs
mod artifact;
mod cleanup;
mod dump;
mod upload;

pub use artifact::BackupArtifact;

use std::path::Path;

use crate::config::AppConfig;
use crate::errors::Result;

/// Whether the local dump file survived the run.
#[derive(Debug, PartialEq, Eq)]
pub enum CleanupStatus {
    Removed,
    /// Upload succeeded but the local file could not be deleted. The run
    /// still counts as a backup success; the file stays behind for manual
    /// removal.
    LeftBehind(String),
}

/// Explicit result of one run, so the caller decides exit-code and alerting
/// behavior instead of errors being swallowed behind log lines.
#[derive(Debug)]
pub struct BackupOutcome {
    pub object_name: String,
    pub local_file: CleanupStatus,
}

/// The three externally visible steps of a run. A trait seam so the gating
/// between steps can be exercised without a database server or a bucket.
trait BackupSteps {
    async fn dump(&mut self, target: &Path) -> Result<()>;
    async fn upload(&mut self, local: &Path, object_name: &str) -> Result<()>;
    async fn cleanup(&mut self, local: &Path) -> Result<()>;
}

struct LiveSteps<'a> {
    config: &'a AppConfig,
}

impl BackupSteps for LiveSteps<'_> {
    async fn dump(&mut self, target: &Path) -> Result<()> {
        dump::dump_cluster(&self.config.database, target)
    }

    async fn upload(&mut self, local: &Path, object_name: &str) -> Result<()> {
        upload::upload_file(&self.config.storage, local, object_name).await
    }

    async fn cleanup(&mut self, local: &Path) -> Result<()> {
        cleanup::remove_local_file(local)
    }
}

/// Runs one backup: dump, upload, delete, strictly in that order, each step
/// gated on the success of the previous one. No retries, no run history.
pub async fn run_backup(config: &AppConfig) -> Result<BackupOutcome> {
    let artifact = BackupArtifact::new(&config.spool_dir);
    let mut steps = LiveSteps { config };
    run_with_steps(&mut steps, &artifact).await
}

async fn run_with_steps<S: BackupSteps>(
    steps: &mut S,
    artifact: &BackupArtifact,
) -> Result<BackupOutcome> {
    println!("Backup run timestamp: {}", artifact.timestamp);

    println!("Dumping cluster to {}", artifact.local_path.display());
    steps.dump(&artifact.local_path).await?;
    println!("✓ Dump written");

    println!("Uploading {}", artifact.filename);
    steps.upload(&artifact.local_path, &artifact.filename).await?;
    println!("✓ Upload complete");

    println!("Deleting {}", artifact.local_path.display());
    let local_file = match steps.cleanup(&artifact.local_path).await {
        Ok(()) => {
            println!("✓ Local file deleted");
            CleanupStatus::Removed
        }
        Err(e) => {
            eprintln!("⚠️ Could not delete local dump file: {e}");
            CleanupStatus::LeftBehind(e.to_string())
        }
    };

    Ok(BackupOutcome {
        object_name: artifact.filename.clone(),
        local_file,
    })
}
