// pgvault/src/backup/upload.rs
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::primitives::ByteStream;
use std::path::Path;

use crate::config::StorageConfig;
use crate::errors::{BackupError, Result};

/// Uploads the dump file to the configured bucket under `object_name`.
///
/// PutObject semantics: an existing object with the same key is overwritten.
/// On any failure the local file is left untouched; there is no retry.
pub async fn upload_file(
    storage: &StorageConfig,
    file_path: &Path,
    object_name: &str,
) -> Result<()> {
    let sdk_config = aws_config::defaults(s3::config::BehaviorVersion::latest())
        .endpoint_url(&storage.endpoint_url)
        .region(Region::new(storage.region.clone()))
        .credentials_provider(s3::config::Credentials::new(
            &storage.access_key_id,
            &storage.secret_access_key,
            None, // session_token
            None, // expiry
            "Static",
        ))
        .load()
        .await;

    let client = s3::Client::new(&sdk_config);

    let body = ByteStream::from_path(file_path).await.map_err(|e| {
        BackupError::Upload(format!(
            "failed to read dump file {}: {e}",
            file_path.display()
        ))
    })?;

    client
        .put_object()
        .bucket(&storage.bucket_name)
        .key(object_name)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            BackupError::Upload(format!(
                "failed to upload {} to bucket {} as {}: {}",
                file_path.display(),
                storage.bucket_name,
                object_name,
                s3::error::DisplayErrorContext(&e)
            ))
        })?;

    Ok(())
}
