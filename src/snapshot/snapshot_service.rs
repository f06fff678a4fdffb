//! Snapshot load/save orchestration.

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::{CostSheetSnapshot, SnapshotRepositoryTrait};
use crate::constants::{MAX_SAVE_ATTEMPTS, SAVE_RETRY_BASE_DELAY_MS};
use crate::costsheet::{CategoryKey, CostCategory};
use crate::errors::{Error, Result, SnapshotError};
use crate::settings::GlobalParameters;

pub struct SnapshotService {
    repository: Arc<dyn SnapshotRepositoryTrait>,
}

impl SnapshotService {
    pub fn new(repository: Arc<dyn SnapshotRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Loads the previous sheet state, or seeds the default sheet when the
    /// store is empty: the five categories reporting in PEN with tax
    /// included, margin only on raw material, no lines.
    pub fn load_or_seed(&self) -> Result<(Vec<CostCategory>, GlobalParameters)> {
        match self.repository.load()? {
            Some(snapshot) => {
                debug!("Restoring sheet from snapshot saved at {}", snapshot.saved_at);
                snapshot.into_parts()
            }
            None => {
                debug!("No prior snapshot found, seeding default sheet");
                let categories = CategoryKey::all()
                    .into_iter()
                    .map(CostCategory::seeded)
                    .collect();
                Ok((categories, GlobalParameters::default()))
            }
        }
    }

    /// Saves with bounded backoff, doubling the delay between attempts.
    /// Exhausted retries surface as a [`SnapshotError::SaveFailed`] for the
    /// caller to retry later; in-memory state is untouched either way.
    pub async fn save(&self, snapshot: &CostSheetSnapshot) -> Result<()> {
        let mut delay = Duration::from_millis(SAVE_RETRY_BASE_DELAY_MS);
        let mut last_error = String::new();

        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            match self.repository.save(snapshot).await {
                Ok(()) => {
                    if attempt > 1 {
                        debug!("Snapshot saved on attempt {}", attempt);
                    }
                    return Ok(());
                }
                Err(err) => {
                    warn!(
                        "Snapshot save attempt {}/{} failed: {}",
                        attempt, MAX_SAVE_ATTEMPTS, err
                    );
                    last_error = err.to_string();
                    if attempt < MAX_SAVE_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(Error::Snapshot(SnapshotError::SaveFailed(format!(
            "after {} attempts: {}",
            MAX_SAVE_ATTEMPTS, last_error
        ))))
    }
}
