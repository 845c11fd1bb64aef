//! Error types for parameter validation and input loading

use thiserror::Error;

/// A parameter set that cannot be projected.
///
/// Raised by `build_parameters` and `ProjectionEngine::new` before any month
/// is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("single-tier pricing requires a monthly price above zero (got {price})")]
    InvalidPricing { price: f64 },

    #[error("tiered pricing is enabled but no tiers are configured")]
    MissingTiers,

    #[error("tier '{name}' is invalid: {reason}")]
    InvalidTier { name: String, reason: String },

    #[error("{field} must be between 0% and 100% (got {value})")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: &'static str, value: f64 },

    #[error("projection length must be between 1 and {max} months (got {months})", max = crate::params::MAX_PROJECTION_MONTHS)]
    InvalidProjectionLength { months: u32 },

    #[error("marketing phase {start_month}..={end_month} is invalid")]
    InvalidMarketingPhase { start_month: u32, end_month: u32 },

    #[error("unknown marketing strategy '{name}'")]
    UnknownMarketingStrategy { name: String },

    #[error("cost escalation at month {month} is invalid: escalations start at month 1")]
    InvalidEscalation { month: u32 },

    #[error("funding round '{name}' is invalid: {reason}")]
    InvalidFundingRound { name: String, reason: String },
}

/// Failure reading scenario inputs from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
