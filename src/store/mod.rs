//! Persistence of the space navigation selection.

pub mod error;
pub mod filestore;
pub mod memory;

pub use error::{Result, StoreError};
pub use filestore::FileSelectionStore;
pub use memory::MemorySelectionStore;

use crate::types::SelectionPath;
use async_trait::async_trait;

#[async_trait]
pub trait SpaceSelectionStore: Send + Sync {
    /// The last persisted selection. An empty path when nothing was stored or
    /// the stored value could not be decoded.
    async fn load_initial_space_selection(&self) -> SelectionPath;

    async fn persist_space_selection(&self, selection: &[String]) -> Result<()>;
}
