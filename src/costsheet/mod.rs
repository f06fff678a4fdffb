//! Cost sheet module - domain models and the engine facade.

mod costsheet_model;
mod costsheet_service;

pub use costsheet_model::{CategoryKey, CostCategory, CostLine, LineKind, NewCostLine};
pub use costsheet_service::CostSheetService;
