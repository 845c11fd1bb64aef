//! Monthly output records and the complete projection result

use serde::{Deserialize, Serialize};

use crate::metrics::SummaryMetrics;

/// Cost components for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub team: f64,
    pub tech: f64,
    pub marketing: f64,

    // Variable costs
    pub infrastructure: f64,
    pub support: f64,
    pub transaction_fees: f64,
}

impl CostBreakdown {
    pub fn fixed(&self) -> f64 {
        self.team + self.tech + self.marketing
    }

    pub fn variable(&self) -> f64 {
        self.infrastructure + self.support + self.transaction_fees
    }

    pub fn total(&self) -> f64 {
        self.fixed() + self.variable()
    }
}

/// Per-tier snapshot under tiered pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSnapshot {
    pub name: String,
    pub users: u64,
    pub new_users: u64,
    pub churned_users: u64,
    pub revenue: f64,
}

/// One simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    // Timing
    pub label: String,
    /// Operational month (1-indexed), or beta index (0-2) for beta months
    pub month: u32,
    /// Operational year (1-indexed), 0 for beta months
    pub year: u32,
    pub is_beta: bool,

    // Users
    pub mau: u64,
    pub free_users: u64,
    pub premium_users: u64,
    pub tiers: Vec<TierSnapshot>,
    pub new_signups: i64,
    pub churned_free_users: u64,
    pub new_paid_users: u64,
    pub churned_paid_users: u64,

    // Rates
    pub target_growth_rate: f64,
    pub realized_growth_rate: f64,
    pub free_churn_rate: f64,
    pub paid_churn_rate: f64,
    pub conversion_rate_displayed: f64,

    // Revenue
    pub subscription_revenue: f64,
    pub b2b_revenue: f64,
    pub monthly_revenue: f64,
    pub arr: f64,

    // Costs and cash
    pub costs: CostBreakdown,
    pub in_marketing_phase: bool,
    pub monthly_costs: f64,
    pub net_income: f64,
    pub funding: f64,
    pub cash_balance: f64,
}

impl MonthRecord {
    /// Pre-launch month: users on the beta, costs only
    pub fn beta(index: u32, label: String, users: u64, costs: CostBreakdown, cash_balance: f64) -> Self {
        let monthly_costs = costs.total();
        Self {
            label,
            month: index,
            year: 0,
            is_beta: true,
            mau: users,
            free_users: users,
            premium_users: 0,
            tiers: Vec::new(),
            new_signups: 0,
            churned_free_users: 0,
            new_paid_users: 0,
            churned_paid_users: 0,
            target_growth_rate: 0.0,
            realized_growth_rate: 0.0,
            free_churn_rate: 0.0,
            paid_churn_rate: 0.0,
            conversion_rate_displayed: 0.0,
            subscription_revenue: 0.0,
            b2b_revenue: 0.0,
            monthly_revenue: 0.0,
            arr: 0.0,
            costs,
            in_marketing_phase: false,
            monthly_costs,
            net_income: -monthly_costs,
            funding: 0.0,
            cash_balance,
        }
    }

    pub fn is_operational(&self) -> bool {
        !self.is_beta
    }
}

/// Complete projection output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Beta months followed by operational months
    pub months: Vec<MonthRecord>,

    pub summary: SummaryMetrics,
}

impl ProjectionResult {
    pub fn beta_months(&self) -> impl Iterator<Item = &MonthRecord> {
        self.months.iter().filter(|m| m.is_beta)
    }

    pub fn operational_months(&self) -> impl Iterator<Item = &MonthRecord> {
        self.months.iter().filter(|m| m.is_operational())
    }

    /// Operational month by 1-indexed month number
    pub fn month(&self, month: u32) -> Option<&MonthRecord> {
        self.operational_months().find(|m| m.month == month)
    }

    pub fn final_month(&self) -> Option<&MonthRecord> {
        self.months.last().filter(|m| m.is_operational())
    }
}
