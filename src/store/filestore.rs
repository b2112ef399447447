use super::{Result, SpaceSelectionStore, StoreError};
use crate::types::SelectionPath;
use async_trait::async_trait;
use log::error;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Keeps the selection as a JSON array in a single file.
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match fs::read(&self.path).await {
            Ok(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, data).await.map_err(StoreError::Io)
    }
}

#[async_trait]
impl SpaceSelectionStore for FileSelectionStore {
    async fn load_initial_space_selection(&self) -> SelectionPath {
        match self.read_json::<SelectionPath>().await {
            Ok(selection) => selection.unwrap_or_default(),
            Err(e) => {
                error!(
                    target: "Store/Selection",
                    "Failed to load space selection from {}: {e}",
                    self.path.display()
                );
                SelectionPath::new()
            }
        }
    }

    async fn persist_space_selection(&self, selection: &[String]) -> Result<()> {
        self.write_json(selection).await
    }
}
