//! Month-by-month projection engine

mod state;
mod engine;
mod records;

pub use state::{ProjectionState, round_users};
pub use engine::{ProjectionEngine, project};
pub use records::{CostBreakdown, MonthRecord, ProjectionResult, TierSnapshot};
