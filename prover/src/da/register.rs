//! Registration of new files in the registry.

use da_circuits::{DaError, Srs, commit_bytes};
use thiserror::Error;
use tracing::info;

use crate::registry::{FileRecord, FileRegistry, NewFileRecord};
use crate::storage::{StorageBackend, validate_content_id};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid content id: {0}")]
    InvalidContentId(String),

    #[error("failed to fetch content: {0:#}")]
    Fetch(anyhow::Error),

    #[error("file of {size} bytes exceeds the SRS capacity of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("commitment failed: {0}")]
    Commit(#[from] DaError),

    #[error("registry error: {0:#}")]
    Registry(anyhow::Error),
}

/// Fetch `content_id`, commit to its content and append it to the registry.
///
/// Files larger than the SRS can commit to are rejected here, so every
/// registered file can later be opened.
pub async fn register_file(
    registry: &dyn FileRegistry,
    storage: &dyn StorageBackend,
    srs: &Srs,
    content_id: &str,
    expiration: i64,
) -> Result<FileRecord, RegisterError> {
    validate_content_id(content_id).map_err(|e| RegisterError::InvalidContentId(e.to_string()))?;

    let content = storage
        .get_object(content_id)
        .await
        .map_err(RegisterError::Fetch)?;

    let max = srs.max_file_bytes();
    if content.len() > max {
        return Err(RegisterError::TooLarge {
            size: content.len(),
            max,
        });
    }

    let new_record = NewFileRecord {
        commitment: commit_bytes(srs, &content)?,
        content_id: content_id.to_string(),
        size_bytes: content.len() as i64,
        expiration,
    };
    let id = registry
        .create_file_record(new_record.clone())
        .map_err(RegisterError::Registry)?;

    info!(id, content_id, size = content.len(), expiration, "File registered");
    Ok(new_record.into_record(id))
}
