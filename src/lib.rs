//! Subscription Projection - Monthly financial projection engine for subscription businesses
//!
//! This library provides:
//! - Scenario parameters with lenient JSON input parsing and CSV cost tables
//! - A three-month beta followed by a monthly user, revenue and cash simulation
//! - Summary metrics (break-even, runway, unit economics, exit valuation, cohorts)
//! - Parallel scenario and sensitivity runs

pub mod error;
pub mod params;
pub mod projection;
pub mod metrics;
pub mod scenario;

// Re-export commonly used types
pub use error::{LoadError, ValidationError};
pub use params::{build_parameters, ParameterSet, RawInputs};
pub use projection::{project, MonthRecord, ProjectionEngine, ProjectionResult};
pub use metrics::SummaryMetrics;
pub use scenario::ScenarioRunner;
