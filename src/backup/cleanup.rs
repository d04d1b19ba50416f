// pgvault/src/backup/cleanup.rs
use std::fs;
use std::path::Path;

use crate::errors::{BackupError, Result};

/// Removes the local dump file. Only called once the upload has succeeded.
pub fn remove_local_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|source| BackupError::Cleanup {
        path: path.display().to_string(),
        source,
    })
}
