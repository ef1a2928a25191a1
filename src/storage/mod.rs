use crate::{
    domain::snapshot::{ConfigurationSnapshot, SnapshotId},
    error::Result,
};
use async_trait::async_trait;

pub mod memory_storage;

pub use memory_storage::InMemorySnapshotStore;

/// Persistence collaborator for configuration snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Validates, stamps `last_modified` and stores a snapshot
    ///
    /// Saving a default snapshot clears the default flag on all others.
    async fn save(&self, snapshot: &ConfigurationSnapshot) -> Result<SnapshotId>;

    /// Loads a snapshot by ID
    async fn load(&self, id: &SnapshotId) -> Result<ConfigurationSnapshot>;

    /// Lists valid snapshots sorted by display name, case-insensitively
    async fn list(&self) -> Result<Vec<ConfigurationSnapshot>>;

    /// Deletes a snapshot
    async fn delete(&self, id: &SnapshotId) -> Result<()>;

    /// The snapshot flagged as default, if any
    async fn load_default(&self) -> Result<Option<ConfigurationSnapshot>> {
        Ok(self.list().await?.into_iter().find(|s| s.is_default))
    }
}
