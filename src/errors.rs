use thiserror::Error;

/// Failure taxonomy for a backup run.
///
/// Each pipeline step maps to exactly one variant; `Config` covers startup
/// failures before any step has run.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dump failed: {detail}\nStderr: {stderr}")]
    Dump { detail: String, stderr: String },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Cleanup failed for {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BackupError>;
