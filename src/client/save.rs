use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::NamedTempFile;

/// Where downloaded bytes end up.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Save `content` under `file_name` and return the final location.
    async fn save(&self, file_name: &str, content: Bytes) -> io::Result<PathBuf>;
}

/// Saves into a directory: bytes go to a transient temp file first, which is
/// then persisted under the original name and released.
#[derive(Debug, Clone)]
pub struct DirectorySaveTarget {
    dir: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Keeps only the final path component so a stored name cannot escape the directory.
fn local_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "download".to_string())
}

#[async_trait]
impl SaveTarget for DirectorySaveTarget {
    async fn save(&self, file_name: &str, content: Bytes) -> io::Result<PathBuf> {
        let dir = self.dir.clone();
        let target = dir.join(local_file_name(file_name));

        tokio::task::spawn_blocking(move || {
            let mut transient = NamedTempFile::new_in(&dir)?;
            transient.write_all(&content)?;
            transient.flush()?;
            transient.persist(&target).map_err(|e| e.error)?;
            Ok::<_, io::Error>(target)
        })
        .await
        .map_err(io::Error::other)?
    }
}
