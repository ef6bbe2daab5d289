//! Object store for uploaded files.
//!
//! Submissions and documents are written under
//! `<folder>/<phaseId>/<generatedId>_<fileName>` and referenced by URL.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The client-supplied file name is unusable.
    #[error("{0}")]
    InvalidName(String),

    /// The generated object key is unusable, usually a bad configured folder.
    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    #[error("Object store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<StoredObject, StorageError>;
}

/// Reduces a client-supplied file name to its final path component.
pub fn sanitize_file_name(raw: &str) -> Result<String, StorageError> {
    let name = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(StorageError::InvalidName("File name is missing".to_string()));
    }
    if name.chars().any(char::is_control) {
        return Err(StorageError::InvalidName(
            "File name contains control characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Builds `<folder>/<phaseId>/<uuid>_<fileName>`.
pub fn object_key(folder: &str, phase_id: Uuid, file_name: &str) -> Result<String, StorageError> {
    let name = sanitize_file_name(file_name)?;
    let folder = folder.trim_matches('/');
    Ok(format!("{}/{}/{}_{}", folder, phase_id, Uuid::new_v4(), name))
}

pub(crate) fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
