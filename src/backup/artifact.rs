// pgvault/src/backup/artifact.rs
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// The single transient value of a run: where the dump lands locally and what
/// the remote object will be called.
#[derive(Debug, Clone)]
pub struct BackupArtifact {
    pub timestamp: String,
    pub filename: String,
    pub local_path: PathBuf,
}

impl BackupArtifact {
    pub fn new(spool_dir: &Path) -> Self {
        Self::at(spool_dir, Utc::now())
    }

    /// Names derive from the instant alone, so two runs within the same
    /// millisecond collide deterministically on the same key.
    pub fn at(spool_dir: &Path, instant: DateTime<Utc>) -> Self {
        let timestamp = instant
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let filename = format!("backup-{timestamp}.sql.gz");
        let local_path = spool_dir.join(&filename);
        BackupArtifact {
            timestamp,
            filename,
            local_path,
        }
    }
}
