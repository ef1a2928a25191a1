use crate::{
    domain::snapshot::{ConfigurationSnapshot, SnapshotId},
    error::{GridError, Result},
    storage::SnapshotStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Keeps snapshots as serialized JSON in memory
///
/// Entries go through the same JSON shape a host's file or database store
/// would persist, so loading returns exactly what was saved.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    entries: RwLock<HashMap<SnapshotId, String>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts raw JSON without validation, as an external store might hold it
    pub async fn insert_raw(&self, id: SnapshotId, json: impl Into<String>) {
        self.entries.write().await.insert(id, json.into());
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: &ConfigurationSnapshot) -> Result<SnapshotId> {
        snapshot.validate()?;

        let mut stored = snapshot.clone();
        stored.touch();
        let json = stored.to_json()?;

        let mut entries = self.entries.write().await;
        if stored.is_default {
            for (id, other) in entries.iter_mut() {
                if *id == stored.id {
                    continue;
                }
                let Ok(mut existing) = ConfigurationSnapshot::from_json(other) else {
                    continue;
                };
                if existing.is_default {
                    debug!("Clearing default flag on snapshot {}", id);
                    existing.is_default = false;
                    *other = existing.to_json()?;
                }
            }
        }
        entries.insert(stored.id.clone(), json);

        debug!("Saved snapshot '{}' ({})", stored.display_name, stored.id);
        Ok(stored.id)
    }

    async fn load(&self, id: &SnapshotId) -> Result<ConfigurationSnapshot> {
        let entries = self.entries.read().await;
        let json = entries
            .get(id)
            .ok_or_else(|| GridError::SnapshotNotFound(id.to_string()))?;
        ConfigurationSnapshot::from_json(json)
    }

    async fn list(&self) -> Result<Vec<ConfigurationSnapshot>> {
        let entries = self.entries.read().await;

        let mut snapshots: Vec<ConfigurationSnapshot> = entries
            .iter()
            .filter_map(|(id, json)| match ConfigurationSnapshot::from_json(json) {
                Ok(snapshot) if snapshot.is_valid() => Some(snapshot),
                Ok(_) => {
                    warn!("Skipping invalid snapshot {}", id);
                    None
                }
                Err(e) => {
                    warn!("Skipping unreadable snapshot {}: {}", id, e);
                    None
                }
            })
            .collect();

        snapshots.sort_by_key(|s| s.display_name.to_lowercase());
        Ok(snapshots)
    }

    async fn delete(&self, id: &SnapshotId) -> Result<()> {
        match self.entries.write().await.remove(id) {
            Some(_) => {
                debug!("Deleted snapshot {}", id);
                Ok(())
            }
            None => Err(GridError::SnapshotNotFound(id.to_string())),
        }
    }
}
