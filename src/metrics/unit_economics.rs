//! Customer acquisition cost, lifetime value and payback

use serde::{Deserialize, Serialize};

use crate::projection::MonthRecord;

/// Sales overhead loaded on top of marketing spend when computing CAC
pub const SALES_OVERHEAD_RATE: f64 = 0.20;

/// Customer lifetime assumed when paid churn is zero
pub const ZERO_CHURN_LIFETIME_MONTHS: f64 = 60.0;

/// Reported payback when customers never pay back their acquisition cost
pub const PAYBACK_SENTINEL_MONTHS: f64 = 999.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    pub total_marketing_cost: f64,
    pub sales_overhead: f64,
    /// New paid conversions across operational months, gross of churn
    pub total_users_acquired: u64,
    pub cac: f64,

    /// Revenue per paid user per month
    pub avg_arpu: f64,
    pub avg_monthly_churn: f64,
    pub avg_customer_lifetime_months: f64,
    pub ltv: f64,
    pub ltv_cac_ratio: f64,
    pub payback_months: f64,
}

impl UnitEconomics {
    /// Derive from operational months only
    pub fn from_months<'a, I>(months: I) -> Self
    where
        I: IntoIterator<Item = &'a MonthRecord>,
    {
        let mut total_marketing_cost = 0.0;
        let mut total_users_acquired = 0u64;
        let mut total_revenue = 0.0;
        let mut paid_user_months = 0u64;
        let mut churn_sum = 0.0;
        let mut month_count = 0usize;

        for m in months.into_iter().filter(|m| m.is_operational()) {
            total_marketing_cost += m.costs.marketing;
            total_users_acquired = total_users_acquired.saturating_add(m.new_paid_users);
            total_revenue += m.monthly_revenue;
            paid_user_months = paid_user_months.saturating_add(m.premium_users);
            churn_sum += m.paid_churn_rate;
            month_count += 1;
        }

        let sales_overhead = total_marketing_cost * SALES_OVERHEAD_RATE;
        let cac = if total_users_acquired > 0 {
            (total_marketing_cost + sales_overhead) / total_users_acquired as f64
        } else {
            0.0
        };

        let avg_arpu = if paid_user_months > 0 {
            total_revenue / paid_user_months as f64
        } else {
            0.0
        };

        let avg_monthly_churn = if month_count > 0 {
            churn_sum / month_count as f64
        } else {
            0.0
        };
        let avg_customer_lifetime_months = if avg_monthly_churn > 0.0 {
            1.0 / avg_monthly_churn
        } else {
            ZERO_CHURN_LIFETIME_MONTHS
        };

        let ltv = avg_arpu * avg_customer_lifetime_months;
        let ltv_cac_ratio = if cac > 0.0 { ltv / cac } else { 0.0 };

        let payback_months = if cac <= 0.0 {
            0.0
        } else if avg_arpu > 0.0 {
            cac / avg_arpu
        } else {
            PAYBACK_SENTINEL_MONTHS
        };

        Self {
            total_marketing_cost,
            sales_overhead,
            total_users_acquired,
            cac,
            avg_arpu,
            avg_monthly_churn,
            avg_customer_lifetime_months,
            ltv,
            ltv_cac_ratio,
            payback_months,
        }
    }
}
