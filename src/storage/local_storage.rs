use std::path::PathBuf;

use anyhow::Context;
use tokio::fs;

/// File-backed string key/value store. Each key lives in `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, anyhow::Error> {
        let root = root.into();
        tracing::info!("Opening local storage at {}", root.display());
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create storage directory {}", root.display()))?;

        Ok(LocalStorage { root })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    pub async fn get_item(&self, key: &str) -> std::io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write through a temp file and rename so a crash never leaves a half-written value.
    pub async fn set_item(&self, key: &str, value: &str) -> std::io::Result<()> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        tracing::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    pub async fn remove_item(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
