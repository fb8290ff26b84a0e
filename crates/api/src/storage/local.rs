use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{join_url, validate_key, FileStorage, StorageError};

/// Stores files in a directory on the local filesystem.
pub struct LocalStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Create the backend, making sure `dir` exists.
    pub async fn new(dir: impl AsRef<Path>, public_base_url: &str) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            public_base_url: public_base_url.to_string(),
        })
    }

    /// Filesystem path for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.path_for(key);
        tokio::fs::write(&path, &data).await?;
        tracing::debug!(path = %path.display(), size = data.len(), "Stored file locally");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }
}
