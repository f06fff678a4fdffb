//! The cost sheet engine facade.
//!
//! Owns the mutable sheet state behind one lock. Every public mutation is a
//! discrete transaction: validate, apply, recompute the full summary, swap it
//! in, all before returning, so dependent derived state is never observable
//! half-updated. Persistence is decoupled from that path: mutations only mark
//! the sheet dirty, and `persist` clones a snapshot under a read lock and
//! saves without holding it.

use log::{debug, error};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::costsheet_model::{CategoryKey, CostCategory, CostLine, NewCostLine};
use crate::errors::{Error, Result};
use crate::fx::Currency;
use crate::settings::GlobalParameters;
use crate::snapshot::{CostSheetSnapshot, SnapshotRepositoryTrait, SnapshotService};
use crate::valuation::{calculate_cost_summary, CostSummary};

struct SheetState {
    categories: Vec<CostCategory>,
    globals: GlobalParameters,
    /// Last fully-computed summary; retained when a recompute fails.
    summary: CostSummary,
}

/// Service managing one cost sheet.
pub struct CostSheetService {
    state: RwLock<SheetState>,
    snapshot_service: SnapshotService,
    dirty: AtomicBool,
}

impl CostSheetService {
    /// Restores the sheet from the repository's snapshot, or seeds the
    /// default sheet when none exists, and computes the initial summary.
    pub fn new(repository: Arc<dyn SnapshotRepositoryTrait>) -> Result<Self> {
        let snapshot_service = SnapshotService::new(repository);
        let (categories, globals) = snapshot_service.load_or_seed()?;
        Self::build(categories, globals, snapshot_service)
    }

    /// Builds the service from explicit state, for embedders that manage
    /// their own seeding.
    pub fn from_parts(
        categories: Vec<CostCategory>,
        globals: GlobalParameters,
        repository: Arc<dyn SnapshotRepositoryTrait>,
    ) -> Result<Self> {
        globals.validate()?;
        Self::build(categories, globals, SnapshotService::new(repository))
    }

    fn build(
        categories: Vec<CostCategory>,
        globals: GlobalParameters,
        snapshot_service: SnapshotService,
    ) -> Result<Self> {
        let summary = calculate_cost_summary(&categories, &globals)?;
        Ok(Self {
            state: RwLock::new(SheetState {
                categories,
                globals,
                summary,
            }),
            snapshot_service,
            dirty: AtomicBool::new(false),
        })
    }

    // ==================== Read API ====================

    /// The combined read model as of the last successful recompute.
    pub fn summary(&self) -> Result<CostSummary> {
        Ok(self.read_state()?.summary.clone())
    }

    pub fn category(&self, key: CategoryKey) -> Result<CostCategory> {
        let state = self.read_state()?;
        state
            .categories
            .iter()
            .find(|category| category.key() == key)
            .cloned()
            .ok_or_else(|| Error::CategoryNotFound(key.to_string()))
    }

    pub fn globals(&self) -> Result<GlobalParameters> {
        Ok(self.read_state()?.globals.clone())
    }

    /// Whether edits since the last successful save are pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    // ==================== Line mutations ====================

    /// Validates and appends a new line, returning the created line.
    pub fn add_line(&self, key: CategoryKey, new_line: NewCostLine) -> Result<CostLine> {
        let line = new_line.into_line()?;
        let created = line.clone();
        debug!("Adding line {} to category '{}'", line.id(), key);
        self.mutate(move |categories, _globals| {
            find_category(categories, key)?.add_line(line)
        })?;
        Ok(created)
    }

    pub fn remove_line(&self, key: CategoryKey, line_id: &str) -> Result<CostSummary> {
        debug!("Removing line {} from category '{}'", line_id, key);
        self.mutate(|categories, _globals| {
            find_category(categories, key)?.remove_line(line_id)?;
            Ok(())
        })
    }

    pub fn set_quantity(
        &self,
        key: CategoryKey,
        line_id: &str,
        quantity: Decimal,
    ) -> Result<CostSummary> {
        self.mutate_line(key, line_id, |line, _globals| line.set_quantity(quantity))
    }

    pub fn set_unit_price(
        &self,
        key: CategoryKey,
        line_id: &str,
        unit_price: Decimal,
    ) -> Result<CostSummary> {
        self.mutate_line(key, line_id, |line, _globals| line.set_unit_price(unit_price))
    }

    pub fn set_days(&self, key: CategoryKey, line_id: &str, days: Decimal) -> Result<CostSummary> {
        self.mutate_line(key, line_id, |line, _globals| line.set_days(days))
    }

    pub fn set_daily_rate(
        &self,
        key: CategoryKey,
        line_id: &str,
        daily_rate: Decimal,
    ) -> Result<CostSummary> {
        self.mutate_line(key, line_id, |line, _globals| line.set_daily_rate(daily_rate))
    }

    pub fn set_description(
        &self,
        key: CategoryKey,
        line_id: &str,
        description: String,
    ) -> Result<CostSummary> {
        self.mutate_line(key, line_id, |line, _globals| {
            line.set_description(description);
            Ok(())
        })
    }

    /// Re-tags a line's currency at the sheet's current exchange rate,
    /// rescaling its price and total so the economic value is preserved.
    pub fn set_line_currency(
        &self,
        key: CategoryKey,
        line_id: &str,
        currency: Currency,
    ) -> Result<CostSummary> {
        self.mutate_line(key, line_id, |line, globals| {
            line.set_currency(currency, globals.exchange_rate())
        })
    }

    /// Flips a line between the two currencies at the current rate.
    pub fn toggle_line_currency(&self, key: CategoryKey, line_id: &str) -> Result<CostSummary> {
        self.mutate_line(key, line_id, |line, globals| {
            line.set_currency(line.currency().toggled(), globals.exchange_rate())
        })
    }

    // ==================== Category mutations ====================

    pub fn set_reporting_currency(
        &self,
        key: CategoryKey,
        currency: Currency,
    ) -> Result<CostSummary> {
        self.mutate(|categories, _globals| {
            find_category(categories, key)?.set_reporting_currency(currency);
            Ok(())
        })
    }

    pub fn set_includes_tax(&self, key: CategoryKey, includes_tax: bool) -> Result<CostSummary> {
        self.mutate(|categories, _globals| {
            find_category(categories, key)?.set_includes_tax(includes_tax);
            Ok(())
        })
    }

    pub fn toggle_includes_tax(&self, key: CategoryKey) -> Result<CostSummary> {
        self.mutate(|categories, _globals| {
            let category = find_category(categories, key)?;
            let includes_tax = category.includes_tax();
            category.set_includes_tax(!includes_tax);
            Ok(())
        })
    }

    // ==================== Global parameter mutations ====================

    /// Updates the shared exchange rate and recomputes every dependent
    /// category.
    pub fn set_exchange_rate(&self, rate: Decimal) -> Result<CostSummary> {
        debug!("Setting exchange rate to {}", rate);
        self.mutate(|_categories, globals| globals.set_exchange_rate(rate))
    }

    pub fn set_margin_percentage(&self, margin: Decimal) -> Result<CostSummary> {
        debug!("Setting margin percentage to {}", margin);
        self.mutate(|_categories, globals| globals.set_margin_percentage(margin))
    }

    pub fn set_tax_rate(&self, rate: Decimal) -> Result<CostSummary> {
        debug!("Setting tax rate to {}", rate);
        self.mutate(|_categories, globals| globals.set_tax_rate(rate))
    }

    pub fn set_preferred_currency(&self, currency: Currency) -> Result<CostSummary> {
        self.mutate(|_categories, globals| {
            globals.set_preferred_currency(currency);
            Ok(())
        })
    }

    // ==================== Persistence ====================

    /// Serializes the current sheet and saves it through the repository.
    ///
    /// Runs off the mutation path: the snapshot is cloned under a read lock
    /// and the save awaited without holding it, so a slow store never blocks
    /// edits. On failure the sheet stays dirty and the error surfaces for a
    /// later retry; in-memory state is never touched.
    pub async fn persist(&self) -> Result<()> {
        let snapshot = {
            let state = self.read_state()?;
            CostSheetSnapshot::capture(&state.categories, &state.globals)
        };

        // Cleared up front so an edit landing mid-save re-marks the sheet.
        self.dirty.store(false, Ordering::SeqCst);
        if let Err(err) = self.snapshot_service.save(&snapshot).await {
            self.dirty.store(true, Ordering::SeqCst);
            return Err(err);
        }
        Ok(())
    }

    // ==================== Internals ====================

    fn read_state(&self) -> Result<RwLockReadGuard<'_, SheetState>> {
        self.state
            .read()
            .map_err(|err| Error::Unexpected(format!("sheet lock poisoned: {}", err)))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, SheetState>> {
        self.state
            .write()
            .map_err(|err| Error::Unexpected(format!("sheet lock poisoned: {}", err)))
    }

    /// Runs one mutation as a transaction. The summary is recomputed in full
    /// and swapped in before the lock is released; a failed recompute keeps
    /// the previous summary as the last known-good read model and surfaces
    /// the error.
    fn mutate<F>(&self, apply: F) -> Result<CostSummary>
    where
        F: FnOnce(&mut Vec<CostCategory>, &mut GlobalParameters) -> Result<()>,
    {
        let mut state = self.write_state()?;
        let SheetState {
            categories,
            globals,
            summary,
        } = &mut *state;

        apply(categories, globals)?;

        match calculate_cost_summary(categories, globals) {
            Ok(fresh) => {
                *summary = fresh.clone();
                drop(state);
                self.dirty.store(true, Ordering::SeqCst);
                Ok(fresh)
            }
            Err(err) => {
                error!("Summary recompute failed, keeping last known-good: {}", err);
                Err(err)
            }
        }
    }

    fn mutate_line<F>(&self, key: CategoryKey, line_id: &str, apply: F) -> Result<CostSummary>
    where
        F: FnOnce(&mut CostLine, &GlobalParameters) -> Result<()>,
    {
        self.mutate(|categories, globals| {
            let line = find_category(categories, key)?
                .line_mut(line_id)
                .ok_or_else(|| Error::LineNotFound(line_id.to_string()))?;
            apply(line, globals)
        })
    }
}

fn find_category(
    categories: &mut [CostCategory],
    key: CategoryKey,
) -> Result<&mut CostCategory> {
    categories
        .iter_mut()
        .find(|category| category.key() == key)
        .ok_or_else(|| Error::CategoryNotFound(key.to_string()))
}
