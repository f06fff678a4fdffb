//! Repository trait for snapshot persistence.

use async_trait::async_trait;

use super::CostSheetSnapshot;
use crate::errors::Result;

/// Contract for the opaque store the sheet is persisted in.
///
/// `load` runs once at engine start; `save` is called off the mutation path
/// and may fail without affecting in-memory state. Whole snapshots are the
/// unit of storage; last writer wins.
#[async_trait]
pub trait SnapshotRepositoryTrait: Send + Sync {
    /// The previous snapshot, or `None` when no state was ever saved.
    fn load(&self) -> Result<Option<CostSheetSnapshot>>;

    /// Persists the full snapshot.
    async fn save(&self, snapshot: &CostSheetSnapshot) -> Result<()>;
}
