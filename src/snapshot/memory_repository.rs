//! In-memory snapshot store, usable as the default adapter and test double.

use async_trait::async_trait;
use std::sync::RwLock;

use super::{CostSheetSnapshot, SnapshotRepositoryTrait};
use crate::errors::{Error, Result, SnapshotError};

#[derive(Default)]
pub struct MemorySnapshotRepository {
    snapshot: RwLock<Option<CostSheetSnapshot>>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a snapshot, as if a prior session had saved.
    pub fn with_snapshot(snapshot: CostSheetSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
        }
    }

    /// The last saved snapshot, if any.
    pub fn stored(&self) -> Option<CostSheetSnapshot> {
        self.snapshot.read().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl SnapshotRepositoryTrait for MemorySnapshotRepository {
    fn load(&self) -> Result<Option<CostSheetSnapshot>> {
        let guard = self
            .snapshot
            .read()
            .map_err(|err| Error::Snapshot(SnapshotError::LoadFailed(err.to_string())))?;
        Ok(guard.clone())
    }

    async fn save(&self, snapshot: &CostSheetSnapshot) -> Result<()> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|err| Error::Snapshot(SnapshotError::SaveFailed(err.to_string())))?;
        *guard = Some(snapshot.clone());
        Ok(())
    }
}
