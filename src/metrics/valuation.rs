//! Exit valuation, investor return and follow-on funding

use serde::{Deserialize, Serialize};

use super::irr::investor_irr;
use crate::params::FundingConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExitValuation {
    pub exit_valuation: f64,
    pub investor_return: f64,
    /// Investor return over seed investment, zero without a seed
    pub return_multiple: f64,
    /// Annualised, held from before the beta to the final month
    pub investor_irr: Option<f64>,
}

impl ExitValuation {
    pub fn new(final_arr: f64, funding: &FundingConfig, total_months: usize) -> Self {
        let exit_valuation = final_arr * funding.valuation_multiple;
        let investor_return = exit_valuation * funding.equity_offered;
        let return_multiple = if funding.seed_investment > 0.0 {
            investor_return / funding.seed_investment
        } else {
            0.0
        };

        Self {
            exit_valuation,
            investor_return,
            return_multiple,
            investor_irr: investor_irr(funding.seed_investment, investor_return, total_months),
        }
    }
}

/// Follow-on funding and its effect on the seed investor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingBreakdown {
    pub rounds: usize,
    pub total_raised: f64,
    pub diluted_seed_equity: f64,
    pub diluted_investor_return: f64,
}

impl FundingBreakdown {
    /// `None` when no follow-on rounds are configured
    pub fn new(funding: &FundingConfig, exit_valuation: f64) -> Option<Self> {
        if funding.rounds.is_empty() {
            return None;
        }
        let diluted_seed_equity = funding.diluted_seed_equity();
        Some(Self {
            rounds: funding.rounds.len(),
            total_raised: funding.rounds.iter().map(|r| r.amount).sum(),
            diluted_seed_equity,
            diluted_investor_return: exit_valuation * diluted_seed_equity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FundingRound, ParameterSet};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_exit_from_final_arr() {
        let funding = ParameterSet::default_scenario().funding;
        let exit = ExitValuation::new(120_000.0, &funding, 39);

        assert_abs_diff_eq!(exit.exit_valuation, 600_000.0);
        assert_abs_diff_eq!(exit.investor_return, 60_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(exit.return_multiple, 0.3, epsilon = 1e-12);
        assert!(exit.investor_irr.unwrap() < 0.0);
    }

    #[test]
    fn test_zero_seed_guards_multiple() {
        let mut funding = ParameterSet::default_scenario().funding;
        funding.seed_investment = 0.0;
        let exit = ExitValuation::new(120_000.0, &funding, 39);

        assert_eq!(exit.return_multiple, 0.0);
        assert_eq!(exit.investor_irr, None);
    }

    #[test]
    fn test_funding_breakdown_dilutes_seed() {
        let mut funding = ParameterSet::default_scenario().funding;
        assert!(FundingBreakdown::new(&funding, 1_000_000.0).is_none());

        funding.rounds.push(FundingRound {
            name: "Series A".into(),
            month: 18,
            amount: 2_000_000.0,
            equity: 0.25,
        });
        let breakdown = FundingBreakdown::new(&funding, 1_000_000.0).unwrap();

        assert_eq!(breakdown.rounds, 1);
        assert_eq!(breakdown.total_raised, 2_000_000.0);
        assert_abs_diff_eq!(breakdown.diluted_seed_equity, 0.075, epsilon = 1e-12);
        assert_abs_diff_eq!(breakdown.diluted_investor_return, 75_000.0, epsilon = 1e-6);
    }
}
