//! Summary metrics derived from a finished month sequence
//!
//! Everything here is a pure function of the [`MonthRecord`]s and the
//! [`ParameterSet`] that produced them. Operational totals exclude the beta;
//! cash figures include it.

mod cohorts;
mod irr;
mod unit_economics;
mod valuation;
mod warnings;

pub use cohorts::{cohort_retention, CohortRetention, MAX_COHORT_CHURN};
pub use irr::{annualized_irr, investor_irr};
pub use unit_economics::{
    UnitEconomics, PAYBACK_SENTINEL_MONTHS, SALES_OVERHEAD_RATE, ZERO_CHURN_LIFETIME_MONTHS,
};
pub use valuation::{ExitValuation, FundingBreakdown};
pub use warnings::{collect_warnings, Warning};

use serde::{Deserialize, Serialize};

use crate::params::ParameterSet;
use crate::projection::MonthRecord;

/// Runway reported when the final month is profitable
pub const RUNWAY_SENTINEL_MONTHS: u32 = 999;

/// Variable cost totals over operational months
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableCostBreakdown {
    pub infrastructure: f64,
    pub support: f64,
    pub transaction_fees: f64,
    pub total: f64,
    /// Share of total operational costs
    pub share_of_costs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub final_mau: u64,
    pub final_paid_users: u64,
    pub final_arr: f64,
    pub final_cash_balance: f64,

    /// First operational month with non-negative net income
    pub break_even_month: Option<u32>,

    // Operational totals
    pub total_revenue: f64,
    pub total_costs: f64,
    pub total_profit: f64,

    pub unit_economics: UnitEconomics,
    pub runway_months: u32,
    pub exit: ExitValuation,

    // Optional breakdowns
    pub cohorts: Option<Vec<CohortRetention>>,
    pub variable_costs: Option<VariableCostBreakdown>,
    pub funding: Option<FundingBreakdown>,

    pub warnings: Vec<Warning>,
}

impl SummaryMetrics {
    pub fn derive(months: &[MonthRecord], params: &ParameterSet) -> Self {
        let operational: Vec<&MonthRecord> = months.iter().filter(|m| m.is_operational()).collect();
        let last = operational.last().copied();

        let total_revenue: f64 = operational.iter().map(|m| m.monthly_revenue).sum();
        let total_costs: f64 = operational.iter().map(|m| m.monthly_costs).sum();

        let break_even_month = operational
            .iter()
            .find(|m| m.net_income >= 0.0)
            .map(|m| m.month);

        let final_arr = last.map(|m| m.arr).unwrap_or(0.0);
        let final_cash_balance = months.last().map(|m| m.cash_balance).unwrap_or(0.0);

        let unit_economics = UnitEconomics::from_months(operational.iter().copied());
        let exit = ExitValuation::new(final_arr, &params.funding, months.len());

        Self {
            final_mau: last.map(|m| m.mau).unwrap_or(0),
            final_paid_users: last.map(|m| m.premium_users).unwrap_or(0),
            final_arr,
            final_cash_balance,
            break_even_month,
            total_revenue,
            total_costs,
            total_profit: total_revenue - total_costs,
            runway_months: last.map(runway_months).unwrap_or(0),
            cohorts: params.cohorts.as_ref().map(|c| cohort_retention(months, c)),
            variable_costs: params
                .variable_costs
                .map(|_| variable_cost_breakdown(&operational, total_costs)),
            funding: FundingBreakdown::new(&params.funding, exit.exit_valuation),
            warnings: collect_warnings(operational.iter().copied(), unit_economics.ltv_cac_ratio),
            unit_economics,
            exit,
        }
    }
}

/// Whole months of cash at the final month's burn
fn runway_months(last: &MonthRecord) -> u32 {
    if last.net_income >= 0.0 || last.monthly_costs <= 0.0 {
        return RUNWAY_SENTINEL_MONTHS;
    }
    (last.cash_balance / last.monthly_costs).floor().max(0.0) as u32
}

fn variable_cost_breakdown(operational: &[&MonthRecord], total_costs: f64) -> VariableCostBreakdown {
    let infrastructure: f64 = operational.iter().map(|m| m.costs.infrastructure).sum();
    let support: f64 = operational.iter().map(|m| m.costs.support).sum();
    let transaction_fees: f64 = operational.iter().map(|m| m.costs.transaction_fees).sum();
    let total = infrastructure + support + transaction_fees;

    VariableCostBreakdown {
        infrastructure,
        support,
        transaction_fees,
        total,
        share_of_costs: if total_costs > 0.0 { total / total_costs } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{CohortConfig, FundingRound, Pricing, VariableCostConfig};
    use crate::projection::{project, ProjectionResult};
    use approx::assert_abs_diff_eq;

    fn run(params: ParameterSet) -> ProjectionResult {
        project(params).unwrap()
    }

    #[test]
    fn test_totals_exclude_beta() {
        let result = run(ParameterSet::default_scenario());
        let s = &result.summary;

        let operational_costs: f64 = result.operational_months().map(|m| m.monthly_costs).sum();
        let beta_costs: f64 = result.beta_months().map(|m| m.monthly_costs).sum();

        assert_abs_diff_eq!(s.total_costs, operational_costs, epsilon = 1e-6);
        assert_eq!(beta_costs, 12_000.0);
        assert_abs_diff_eq!(
            s.final_cash_balance,
            200_000.0 - beta_costs + s.total_profit,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_final_figures_match_last_month() {
        let result = run(ParameterSet::default_scenario());
        let last = result.final_month().unwrap();

        assert_eq!(result.summary.final_mau, last.mau);
        assert_eq!(result.summary.final_arr, last.arr);
        assert_abs_diff_eq!(
            result.summary.exit.exit_valuation,
            last.arr * 5.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_break_even_is_first_profitable_month() {
        let result = run(ParameterSet::default_scenario());
        match result.summary.break_even_month {
            Some(month) => {
                assert!(result.month(month).unwrap().net_income >= 0.0);
                assert!(result
                    .operational_months()
                    .filter(|m| m.month < month)
                    .all(|m| m.net_income < 0.0));
            }
            None => assert!(result.operational_months().all(|m| m.net_income < 0.0)),
        }
    }

    #[test]
    fn test_break_even_survives_later_losses() {
        // Cheap first year, expensive afterwards
        let mut params = ParameterSet::default_scenario();
        params.pricing = Pricing::single(500.0);
        params.costs.yearly[1].team = 5_000_000.0;
        params.projection_months = 24;
        let result = run(params);

        assert_eq!(result.summary.break_even_month, Some(1));
        assert!(result.month(13).unwrap().net_income < 0.0);
        assert!(result.summary.runway_months < RUNWAY_SENTINEL_MONTHS);
    }

    #[test]
    fn test_profitable_final_month_reports_sentinel_runway() {
        let mut params = ParameterSet::default_scenario();
        params.pricing = Pricing::single(1000.0);
        let result = run(params);
        assert!(result.final_month().unwrap().net_income >= 0.0);
        assert_eq!(result.summary.runway_months, RUNWAY_SENTINEL_MONTHS);
    }

    #[test]
    fn test_runway_from_final_burn() {
        let result = run(ParameterSet::default_scenario());
        let last = result.final_month().unwrap();
        if last.net_income < 0.0 {
            let expected = (last.cash_balance / last.monthly_costs).floor().max(0.0) as u32;
            assert_eq!(result.summary.runway_months, expected);
        }
    }

    #[test]
    fn test_optional_breakdowns_follow_features() {
        let plain = run(ParameterSet::default_scenario());
        assert!(plain.summary.cohorts.is_none());
        assert!(plain.summary.variable_costs.is_none());
        assert!(plain.summary.funding.is_none());

        let mut params = ParameterSet::default_scenario();
        params.cohorts = Some(CohortConfig { decay_rate: 0.02 });
        params.variable_costs = Some(VariableCostConfig {
            infra_cost_per_user: 0.05,
            support_cost_per_user: 0.5,
            transaction_fee_rate: 0.029,
        });
        params.funding.rounds.push(FundingRound {
            name: "Seed extension".into(),
            month: 6,
            amount: 100_000.0,
            equity: 0.05,
        });
        let full = run(params);

        assert!(!full.summary.cohorts.as_ref().unwrap().is_empty());
        let vc = full.summary.variable_costs.unwrap();
        assert_abs_diff_eq!(vc.total, vc.infrastructure + vc.support + vc.transaction_fees);
        assert!(vc.share_of_costs > 0.0 && vc.share_of_costs < 1.0);
        assert_eq!(full.summary.funding.as_ref().unwrap().total_raised, 100_000.0);
    }
}
