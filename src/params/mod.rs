//! Business assumptions for a projection run
//!
//! A [`ParameterSet`] is built once per run, validated, and handed to the
//! engine by value. Every rate is a fraction in `[0, 1]` by the time it lands
//! here; raw percentage inputs are normalised in [`raw::build_parameters`].

mod costs;
mod funding;
mod pricing;
mod rates;
pub mod loader;
pub mod raw;

pub use costs::{
    BetaMonth, CostEscalation, CostSchedule, FixedCosts, MarketingPhase, MarketingStrategy,
    VariableCostConfig, YearlyCosts,
};
pub use funding::{FundingConfig, FundingRound};
pub use pricing::{B2bConfig, Pricing, PricingModel, Tier};
pub use rates::{ChurnConfig, ConversionConfig, GrowthSchedule, MAX_CONVERSION_RATE};
pub use raw::{build_parameters, RawInputs};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of pre-launch beta months
pub const BETA_MONTHS: usize = 3;

/// Longest supported projection horizon
pub const MAX_PROJECTION_MONTHS: u32 = 600;

/// Retention-decay model for cohort tracking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortConfig {
    /// Yearly increase in a cohort's monthly churn as it ages
    pub decay_rate: f64,
}

/// Validated, immutable snapshot of every assumption for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Free users at the start of operational month 1
    pub starting_mau: u64,

    pub pricing: Pricing,
    pub growth: GrowthSchedule,
    pub churn: ChurnConfig,
    pub conversion: ConversionConfig,
    pub costs: CostSchedule,
    pub beta: [BetaMonth; BETA_MONTHS],
    pub funding: FundingConfig,
    pub projection_months: u32,

    /// Calendar month of operational month 1, used for labels only
    pub launch_date: Option<NaiveDate>,

    // Optional features
    pub b2b: Option<B2bConfig>,
    pub variable_costs: Option<VariableCostConfig>,
    pub cohorts: Option<CohortConfig>,
}

impl ParameterSet {
    /// Reference scenario: 1,000 starting users, $9.99 plan, 36 months
    pub fn default_scenario() -> Self {
        Self {
            starting_mau: 1000,
            pricing: Pricing {
                model: PricingModel::Single { monthly_price: 9.99 },
                annual_discount: 0.15,
                annual_plan_share: 0.25,
            },
            growth: GrowthSchedule::new(vec![0.16, 0.10, 0.06]),
            churn: ChurnConfig {
                free_churn_rate: 0.20,
                paid_churn_rate: 0.05,
                improvement_per_year: 0.0,
            },
            conversion: ConversionConfig {
                initial_rate: 0.02,
                growth_per_year: 0.0,
            },
            costs: CostSchedule::from_yearly(vec![
                YearlyCosts::new(4500.0, 800.0, 1200.0),
                YearlyCosts::new(12000.0, 1800.0, 3500.0),
                YearlyCosts::new(25000.0, 4000.0, 8000.0),
            ]),
            beta: [
                BetaMonth { users: 50, team: 3000.0, tech: 500.0, marketing: 0.0 },
                BetaMonth { users: 150, team: 3000.0, tech: 500.0, marketing: 300.0 },
                BetaMonth { users: 400, team: 3500.0, tech: 600.0, marketing: 600.0 },
            ],
            funding: FundingConfig {
                seed_investment: 200_000.0,
                equity_offered: 0.10,
                valuation_multiple: 5.0,
                rounds: Vec::new(),
            },
            projection_months: 36,
            launch_date: None,
            b2b: None,
            variable_costs: None,
            cohorts: None,
        }
    }

    /// Check every invariant the engine relies on
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pricing.validate()?;
        self.growth.validate()?;
        self.churn.validate()?;
        self.conversion.validate()?;
        self.costs.validate()?;
        self.funding.validate()?;

        if self.projection_months == 0 || self.projection_months > MAX_PROJECTION_MONTHS {
            return Err(ValidationError::InvalidProjectionLength {
                months: self.projection_months,
            });
        }

        if let Some(b2b) = &self.b2b {
            check_non_negative("B2B revenue share", b2b.share)?;
        }
        if let Some(vc) = &self.variable_costs {
            check_non_negative("infrastructure cost per user", vc.infra_cost_per_user)?;
            check_non_negative("support cost per user", vc.support_cost_per_user)?;
            check_fraction("transaction fee rate", vc.transaction_fee_rate)?;
        }
        if let Some(cohorts) = &self.cohorts {
            check_non_negative("cohort retention decay", cohorts.decay_rate)?;
        }
        Ok(())
    }
}

pub(crate) fn check_fraction(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::RateOutOfRange { field, value })
    }
}

pub(crate) fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NegativeAmount { field, value })
    }
}
