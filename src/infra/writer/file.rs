//! Atomic JSON file writer.
//!
//! Snapshots are serialized to a sibling temp file, fsynced, then renamed
//! over the target so readers never observe a partial write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::{DurableWriter, SaverError, Snapshot};

/// Writes each snapshot as pretty JSON, replacing the file atomically.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    path: PathBuf,
}

impl AtomicFileWriter {
    /// Writer targeting `path`. Parent directories are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temp file used while a write is in progress.
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read back the last written snapshot. `Ok(None)` if nothing was written.
    pub async fn read<T>(&self) -> Result<Option<T>, SaverError>
    where
        T: DeserializeOwned,
    {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, bytes: &[u8]) -> Result<(), SaverError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

#[async_trait]
impl<S> DurableWriter<S> for AtomicFileWriter
where
    S: Snapshot,
{
    async fn write(&self, snapshot: S) -> Result<(), SaverError> {
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        if let Err(e) = self.replace(&bytes).await {
            let _ = tokio::fs::remove_file(self.temp_path()).await;
            return Err(e);
        }
        Ok(())
    }
}
