//! Photo storage backends.
//!
//! Handlers only see the [`FileStorage`] trait; the concrete backend is
//! chosen at startup from [`StorageConfig`].

mod local;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StorageConfig;

pub use local::LocalStorage;
pub use s3::S3Storage;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A place uploaded files can be written to and served from.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Short backend name for logging.
    fn backend_name(&self) -> &'static str;

    /// Store `data` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    /// Public URL at which `key` can be fetched.
    fn public_url(&self, key: &str) -> String;
}

/// Keys are flat file names: no separators, no parent references.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{key}", base.trim_end_matches('/'))
}

/// Build the configured backend.
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn FileStorage>, StorageError> {
    let storage: Arc<dyn FileStorage> = match config {
        StorageConfig::Local {
            dir,
            public_base_url,
        } => Arc::new(LocalStorage::new(dir, public_base_url).await?),
        StorageConfig::S3 {
            bucket,
            region,
            public_base_url,
        } => Arc::new(S3Storage::from_env(bucket, region, public_base_url.clone()).await),
    };
    tracing::info!(backend = storage.backend_name(), "Photo storage ready");
    Ok(storage)
}
