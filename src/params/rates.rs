//! Year-indexed growth, churn and conversion assumptions

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Hard ceiling on the monthly conversion rate
pub const MAX_CONVERSION_RATE: f64 = 0.75;

/// Monthly signup growth rate by operational year (1-indexed)
///
/// Years past the end of the schedule reuse the last defined rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSchedule {
    rates: Vec<f64>,
}

impl GrowthSchedule {
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates }
    }

    /// Monthly growth rate for an operational year
    pub fn rate_for_year(&self, year: u32) -> f64 {
        let idx = (year as usize).saturating_sub(1).min(self.rates.len().saturating_sub(1));
        self.rates.get(idx).copied().unwrap_or(0.0)
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for &rate in &self.rates {
            // Contraction is allowed, but a pool cannot shrink by more than all of it
            if !rate.is_finite() || rate < -1.0 {
                return Err(ValidationError::RateOutOfRange {
                    field: "growth rate",
                    value: rate,
                });
            }
        }
        Ok(())
    }
}

/// Monthly churn with a yearly improvement factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnConfig {
    pub free_churn_rate: f64,
    pub paid_churn_rate: f64,

    /// Linear yearly reduction applied as `1 - improvement * (year - 1)`
    pub improvement_per_year: f64,
}

impl ChurnConfig {
    /// Multiplier applied to base churn in an operational year, never negative
    pub fn improvement_factor(&self, year: u32) -> f64 {
        let years_elapsed = year.saturating_sub(1) as f64;
        (1.0 - self.improvement_per_year * years_elapsed).max(0.0)
    }

    pub fn effective_free_churn(&self, year: u32) -> f64 {
        self.free_churn_rate * self.improvement_factor(year)
    }

    pub fn effective_paid_churn(&self, year: u32) -> f64 {
        self.paid_churn_rate * self.improvement_factor(year)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        super::check_fraction("free churn rate", self.free_churn_rate)?;
        super::check_fraction("paid churn rate", self.paid_churn_rate)?;
        super::check_non_negative("churn improvement", self.improvement_per_year)?;
        Ok(())
    }
}

/// Free-to-paid conversion, stepping up once per operational year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub initial_rate: f64,
    pub growth_per_year: f64,
}

impl ConversionConfig {
    /// Conversion rate in force for an operational year, capped at [`MAX_CONVERSION_RATE`]
    pub fn rate_for_year(&self, year: u32) -> f64 {
        let steps = year.saturating_sub(1) as i32;
        (self.initial_rate * (1.0 + self.growth_per_year).powi(steps)).min(MAX_CONVERSION_RATE)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        super::check_fraction("initial conversion rate", self.initial_rate)?;
        super::check_non_negative("conversion growth", self.growth_per_year)?;
        Ok(())
    }
}
