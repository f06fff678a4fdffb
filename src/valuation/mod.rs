//! Valuation module - pure aggregation over the cost sheet.

mod valuation_calculator;
mod valuation_model;

pub use valuation_calculator::{calculate_category_valuation, calculate_cost_summary};
pub use valuation_model::{CategoryValuation, CostSummary};

#[cfg(test)]
mod valuation_calculator_tests;
