//! Cost structure: yearly baselines, escalations, marketing phases, variable costs

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fixed monthly costs for one operational year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyCosts {
    pub team: f64,
    pub tech: f64,
    pub marketing: f64,
}

impl YearlyCosts {
    pub fn new(team: f64, tech: f64, marketing: f64) -> Self {
        Self { team, tech, marketing }
    }
}

/// One-time delta to monthly costs, in force from `month` onward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEscalation {
    pub month: u32,
    pub team_delta: f64,
    pub tech_delta: f64,
    pub marketing_delta: f64,
}

/// Named multiplier curve shaping a marketing phase budget month by month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarketingStrategy {
    /// Flat spend at the phase budget
    Steady,
    /// Heavy opening months tapering to the budget
    LaunchBurst,
    /// Linear ramp from half to one and a half times the budget
    Ramp,
    /// Alternating heavy and light months
    Pulse,
    /// Explicit per-position multipliers
    Custom(Vec<f64>),
}

impl MarketingStrategy {
    /// Parse a strategy name as entered in a form or CSV
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        match name.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "" | "steady" => Ok(MarketingStrategy::Steady),
            "launch_burst" | "burst" => Ok(MarketingStrategy::LaunchBurst),
            "ramp" => Ok(MarketingStrategy::Ramp),
            "pulse" => Ok(MarketingStrategy::Pulse),
            _ => Err(ValidationError::UnknownMarketingStrategy { name: name.to_string() }),
        }
    }

    /// Multiplier at a 0-based position within a phase of `phase_len` months
    pub fn multiplier(&self, position: u32, phase_len: u32) -> f64 {
        const BURST: [f64; 4] = [2.0, 1.5, 1.25, 1.0];

        match self {
            MarketingStrategy::Steady => 1.0,
            MarketingStrategy::LaunchBurst => BURST[(position as usize).min(BURST.len() - 1)],
            MarketingStrategy::Ramp => {
                if phase_len <= 1 {
                    1.0
                } else {
                    0.5 + position.min(phase_len - 1) as f64 / (phase_len - 1) as f64
                }
            }
            MarketingStrategy::Pulse => {
                if position % 2 == 0 {
                    1.5
                } else {
                    0.5
                }
            }
            MarketingStrategy::Custom(curve) => curve
                .get(position as usize)
                .or_else(|| curve.last())
                .copied()
                .unwrap_or(1.0),
        }
    }
}

/// Time-windowed replacement of the marketing baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingPhase {
    pub start_month: u32,
    pub end_month: u32,
    pub budget: f64,
    pub strategy: Option<MarketingStrategy>,
}

impl MarketingPhase {
    pub fn covers(&self, month: u32) -> bool {
        (self.start_month..=self.end_month).contains(&month)
    }

    /// Marketing spend for a month inside this phase
    pub fn spend(&self, month: u32) -> f64 {
        let position = month.saturating_sub(self.start_month);
        let len = self.end_month.saturating_sub(self.start_month) + 1;
        let multiplier = self
            .strategy
            .as_ref()
            .map(|s| s.multiplier(position, len))
            .unwrap_or(1.0);
        self.budget * multiplier
    }
}

/// Per-user and per-revenue costs that scale with the business
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableCostConfig {
    /// Infrastructure cost per active user per month
    pub infra_cost_per_user: f64,

    /// Support cost per paid user per month
    pub support_cost_per_user: f64,

    /// Payment processing fee as a fraction of revenue
    pub transaction_fee_rate: f64,
}

/// Fixed cost components resolved for a single month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedCosts {
    pub team: f64,
    pub tech: f64,
    pub marketing: f64,
    /// Marketing baseline was replaced by a phase budget
    pub in_marketing_phase: bool,
}

/// Complete cost configuration for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSchedule {
    /// Baseline fixed costs by operational year (1-indexed)
    pub yearly: Vec<YearlyCosts>,
    pub escalations: Vec<CostEscalation>,
    pub marketing_phases: Vec<MarketingPhase>,
}

impl CostSchedule {
    pub fn from_yearly(yearly: Vec<YearlyCosts>) -> Self {
        Self {
            yearly,
            escalations: Vec::new(),
            marketing_phases: Vec::new(),
        }
    }

    /// Baseline for an operational year, reusing the last defined year
    pub fn baseline(&self, year: u32) -> YearlyCosts {
        let idx = (year as usize).saturating_sub(1).min(self.yearly.len().saturating_sub(1));
        self.yearly.get(idx).copied().unwrap_or_default()
    }

    /// Phase in force for a month; the earliest-starting phase wins on overlap
    pub fn active_phase(&self, month: u32) -> Option<&MarketingPhase> {
        self.marketing_phases
            .iter()
            .filter(|p| p.covers(month))
            .min_by_key(|p| p.start_month)
    }

    /// Resolve fixed costs for an operational month
    ///
    /// Phase budgets replace the marketing baseline; escalation deltas for
    /// every escalation at or before `month` are then added to all three
    /// categories.
    pub fn fixed_costs(&self, month: u32, year: u32) -> FixedCosts {
        let base = self.baseline(year);
        let phase = self.active_phase(month);

        let mut costs = FixedCosts {
            team: base.team,
            tech: base.tech,
            marketing: phase.map(|p| p.spend(month)).unwrap_or(base.marketing),
            in_marketing_phase: phase.is_some(),
        };

        for esc in self.escalations.iter().filter(|e| e.month <= month) {
            costs.team += esc.team_delta;
            costs.tech += esc.tech_delta;
            costs.marketing += esc.marketing_delta;
        }

        costs
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for esc in &self.escalations {
            if esc.month == 0 {
                return Err(ValidationError::InvalidEscalation { month: esc.month });
            }
        }
        for phase in &self.marketing_phases {
            if phase.start_month == 0 || phase.end_month < phase.start_month {
                return Err(ValidationError::InvalidMarketingPhase {
                    start_month: phase.start_month,
                    end_month: phase.end_month,
                });
            }
            super::check_non_negative("marketing phase budget", phase.budget)?;
        }
        Ok(())
    }
}

/// Pre-launch month: users on the beta and the spend behind it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BetaMonth {
    pub users: u64,
    pub team: f64,
    pub tech: f64,
    pub marketing: f64,
}

impl BetaMonth {
    pub fn total_costs(&self) -> f64 {
        self.team + self.tech + self.marketing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn schedule() -> CostSchedule {
        CostSchedule::from_yearly(vec![
            YearlyCosts::new(4500.0, 800.0, 1200.0),
            YearlyCosts::new(12000.0, 1800.0, 3500.0),
            YearlyCosts::new(25000.0, 4000.0, 8000.0),
        ])
    }

    #[test]
    fn test_baseline_uses_last_year_beyond_schedule() {
        let s = schedule();
        assert_eq!(s.baseline(2).team, 12000.0);
        assert_eq!(s.baseline(9).marketing, 8000.0);
        assert_eq!(CostSchedule::from_yearly(vec![]).baseline(1), YearlyCosts::default());
    }

    #[test]
    fn test_escalations_are_cumulative_from_their_month() {
        let mut s = schedule();
        s.escalations = vec![
            CostEscalation { month: 6, team_delta: 2000.0, tech_delta: 0.0, marketing_delta: 0.0 },
            CostEscalation { month: 10, team_delta: 1000.0, tech_delta: 300.0, marketing_delta: 0.0 },
        ];
        assert_eq!(s.fixed_costs(5, 1).team, 4500.0);
        assert_eq!(s.fixed_costs(6, 1).team, 6500.0);
        let m10 = s.fixed_costs(10, 1);
        assert_eq!(m10.team, 7500.0);
        assert_eq!(m10.tech, 1100.0);
    }

    #[test]
    fn test_marketing_phase_replaces_baseline_then_escalates() {
        let mut s = schedule();
        s.marketing_phases = vec![MarketingPhase {
            start_month: 3,
            end_month: 5,
            budget: 5000.0,
            strategy: None,
        }];
        s.escalations = vec![CostEscalation {
            month: 1,
            team_delta: 0.0,
            tech_delta: 0.0,
            marketing_delta: 250.0,
        }];

        let inside = s.fixed_costs(4, 1);
        assert!(inside.in_marketing_phase);
        assert_eq!(inside.marketing, 5250.0);

        let outside = s.fixed_costs(6, 1);
        assert!(!outside.in_marketing_phase);
        assert_eq!(outside.marketing, 1450.0);
    }

    #[test]
    fn test_earliest_phase_wins_on_overlap() {
        let mut s = schedule();
        s.marketing_phases = vec![
            MarketingPhase { start_month: 4, end_month: 8, budget: 900.0, strategy: None },
            MarketingPhase { start_month: 2, end_month: 6, budget: 700.0, strategy: None },
        ];
        assert_eq!(s.fixed_costs(5, 1).marketing, 700.0);
        assert_eq!(s.fixed_costs(7, 1).marketing, 900.0);
    }

    #[test]
    fn test_strategy_curves() {
        assert_eq!(MarketingStrategy::LaunchBurst.multiplier(0, 6), 2.0);
        assert_eq!(MarketingStrategy::LaunchBurst.multiplier(10, 12), 1.0);
        assert_abs_diff_eq!(MarketingStrategy::Ramp.multiplier(0, 5), 0.5);
        assert_abs_diff_eq!(MarketingStrategy::Ramp.multiplier(4, 5), 1.5);
        assert_eq!(MarketingStrategy::Ramp.multiplier(0, 1), 1.0);
        assert_eq!(MarketingStrategy::Pulse.multiplier(3, 6), 0.5);
        let custom = MarketingStrategy::Custom(vec![0.8, 1.2]);
        assert_eq!(custom.multiplier(1, 4), 1.2);
        assert_eq!(custom.multiplier(3, 4), 1.2);
    }

    #[test]
    fn test_phase_spend_uses_position_in_window() {
        let phase = MarketingPhase {
            start_month: 7,
            end_month: 12,
            budget: 1000.0,
            strategy: Some(MarketingStrategy::LaunchBurst),
        };
        assert_eq!(phase.spend(7), 2000.0);
        assert_eq!(phase.spend(8), 1500.0);
        assert_eq!(phase.spend(12), 1000.0);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(MarketingStrategy::from_name("Launch Burst"), Ok(MarketingStrategy::LaunchBurst));
        assert_eq!(MarketingStrategy::from_name(""), Ok(MarketingStrategy::Steady));
        assert!(MarketingStrategy::from_name("viral").is_err());
    }

    #[test]
    fn test_inverted_phase_rejected() {
        let mut s = schedule();
        s.marketing_phases = vec![MarketingPhase { start_month: 9, end_month: 3, budget: 1.0, strategy: None }];
        assert_eq!(
            s.validate(),
            Err(ValidationError::InvalidMarketingPhase { start_month: 9, end_month: 3 })
        );
    }
}
