//! Running state carried between simulated months

use crate::params::ParameterSet;

/// User pools and balances at a point in the projection
///
/// Lives only for the duration of one `project()` call.
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current operational month (1-indexed, 0 before launch)
    pub month: u32,

    /// Operational year (1-indexed)
    pub year: u32,

    /// Free users
    pub free_users: u64,

    /// Paid users under single-plan pricing
    pub paid_users: u64,

    /// Paid users per tier under tiered pricing, in tier order
    pub tier_users: Vec<u64>,

    /// Cash on hand
    pub cash_balance: f64,

    /// Some operational month has had non-negative net income
    pub broke_even: bool,

    /// Cash has dipped below zero at least once
    pub cash_exhausted: bool,
}

impl ProjectionState {
    /// Opening state before the beta: seed cash and the configured launch audience
    pub fn from_params(params: &ParameterSet) -> Self {
        Self {
            month: 0,
            year: 0,
            free_users: params.starting_mau,
            paid_users: 0,
            tier_users: vec![0; params.pricing.tiers().len()],
            cash_balance: params.funding.seed_investment,
            broke_even: false,
            cash_exhausted: false,
        }
    }

    /// Advance to the next operational month
    pub fn advance_month(&mut self) {
        self.month += 1;
        self.year = self.month.div_ceil(12);
    }

    /// Paid users across every plan
    pub fn total_paid(&self) -> u64 {
        self.tier_users
            .iter()
            .fold(self.paid_users, |total, &users| total.saturating_add(users))
    }

    /// Monthly active users (free + paid)
    pub fn mau(&self) -> u64 {
        self.free_users.saturating_add(self.total_paid())
    }

    /// Record a month's net income, returning true when it is the first break-even month
    pub fn record_net_income(&mut self, net_income: f64) -> bool {
        if self.broke_even || net_income < 0.0 {
            return false;
        }
        self.broke_even = true;
        true
    }
}

/// Round a fractional headcount to whole users, never below zero
pub fn round_users(value: f64) -> u64 {
    if value.is_finite() {
        value.round().max(0.0) as u64
    } else {
        0
    }
}

/// Apply a signed headcount change to a pool, floored at zero
pub fn apply_delta(pool: u64, delta: i64) -> u64 {
    if delta >= 0 {
        pool.saturating_add(delta as u64)
    } else {
        pool.saturating_sub(delta.unsigned_abs())
    }
}
