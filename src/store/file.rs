//! One JSON file per key under a root directory.
//!
//! Keys map to file names with `:` replaced by `--`; any other character
//! outside `[A-Za-z0-9_-]` is rejected. Writes go to a temp file first and
//! are renamed into place, so a crash never leaves a half-written document.
//! A file that fails to parse reads as absent.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::{KeyValueStore, StoreError};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the store directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(format!("{}.json", file_stem(key)?)))
    }
}

pub(crate) fn file_stem(key: &str) -> Result<String, StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_owned()));
    }
    let mut stem = String::with_capacity(key.len());
    for ch in key.chars() {
        match ch {
            ':' => stem.push_str("--"),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => stem.push(c),
            _ => return Err(StoreError::InvalidKey(key.to_owned())),
        }
    }
    Ok(stem)
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable store file — treating as absent");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&value)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
