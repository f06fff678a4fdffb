//! Snapshot module - versioned persistence of the whole sheet.

mod memory_repository;
mod snapshot_model;
mod snapshot_service;
mod snapshot_traits;

pub use memory_repository::MemorySnapshotRepository;
pub use snapshot_model::{CostSheetSnapshot, SnapshotCategory, SnapshotLine};
pub use snapshot_service::SnapshotService;
pub use snapshot_traits::SnapshotRepositoryTrait;
