use super::{Result, SpaceSelectionStore};
use crate::types::SelectionPath;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// In-memory selection store that remembers every write.
#[derive(Default)]
pub struct MemorySelectionStore {
    initial: SelectionPath,
    writes: Mutex<Vec<SelectionPath>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(initial: SelectionPath) -> Self {
        Self {
            initial,
            writes: Mutex::default(),
        }
    }

    /// Every persisted value, oldest first.
    pub fn writes(&self) -> Vec<SelectionPath> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_write(&self) -> Option<SelectionPath> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl SpaceSelectionStore for MemorySelectionStore {
    async fn load_initial_space_selection(&self) -> SelectionPath {
        self.last_write().unwrap_or_else(|| self.initial.clone())
    }

    async fn persist_space_selection(&self, selection: &[String]) -> Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(selection.to_vec());
        Ok(())
    }
}
