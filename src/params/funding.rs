//! Investment terms: seed round, exit assumptions and follow-on rounds

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Follow-on round landing in cash at the start of an operational month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    pub name: String,
    pub month: u32,
    pub amount: f64,

    /// Equity sold in this round, diluting earlier holders
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingConfig {
    /// Opening cash balance, spent first on the beta
    pub seed_investment: f64,

    /// Equity sold to the seed investor
    pub equity_offered: f64,

    /// Exit valuation as a multiple of final ARR
    pub valuation_multiple: f64,

    pub rounds: Vec<FundingRound>,
}

impl FundingConfig {
    /// Cash injected by follow-on rounds in an operational month
    pub fn raised_in_month(&self, month: u32) -> f64 {
        self.rounds
            .iter()
            .filter(|r| r.month == month)
            .map(|r| r.amount)
            .sum()
    }

    /// Seed investor stake after dilution by every follow-on round
    pub fn diluted_seed_equity(&self) -> f64 {
        self.rounds
            .iter()
            .fold(self.equity_offered, |stake, r| stake * (1.0 - r.equity))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        super::check_non_negative("seed investment", self.seed_investment)?;
        super::check_fraction("equity offered", self.equity_offered)?;
        super::check_non_negative("valuation multiple", self.valuation_multiple)?;

        for round in &self.rounds {
            let invalid = |reason: &str| ValidationError::InvalidFundingRound {
                name: round.name.clone(),
                reason: reason.to_string(),
            };
            if round.month == 0 {
                return Err(invalid("rounds land in operational months, starting at 1"));
            }
            if !(round.amount >= 0.0) {
                return Err(invalid("amount must not be negative"));
            }
            if !(0.0..1.0).contains(&round.equity) {
                return Err(invalid("equity must be at least 0% and below 100%"));
            }
        }
        Ok(())
    }
}
