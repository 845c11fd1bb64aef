//! Cohort retention under an ageing churn model

use serde::{Deserialize, Serialize};

use crate::params::CohortConfig;
use crate::projection::{round_users, MonthRecord};

/// Ceiling on a cohort's monthly churn
pub const MAX_COHORT_CHURN: f64 = 0.15;

/// Retention of the paid users acquired in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRetention {
    pub acquisition_month: u32,
    pub start_year: u32,
    pub initial_users: u64,
    pub months_elapsed: u32,
    /// Monthly churn after ageing, capped at [`MAX_COHORT_CHURN`]
    pub final_churn: f64,
    pub retained_users: u64,
    pub retention_rate: f64,
}

/// Retention for every cohort, measured at the final operational month
///
/// Each cohort starts at the paid churn in force in its acquisition year and
/// ages by `decay_rate` per year elapsed.
pub fn cohort_retention(months: &[MonthRecord], config: &CohortConfig) -> Vec<CohortRetention> {
    let final_month = match months.iter().rev().find(|m| m.is_operational()) {
        Some(m) => m.month,
        None => return Vec::new(),
    };

    months
        .iter()
        .filter(|m| m.is_operational() && m.new_paid_users > 0)
        .map(|m| {
            let months_elapsed = final_month - m.month;
            let final_churn = (m.paid_churn_rate + config.decay_rate * months_elapsed as f64 / 12.0)
                .min(MAX_COHORT_CHURN);
            let survival = (1.0 - final_churn).powi(months_elapsed as i32);
            let retained_users = round_users(m.new_paid_users as f64 * survival);

            CohortRetention {
                acquisition_month: m.month,
                start_year: m.year,
                initial_users: m.new_paid_users,
                months_elapsed,
                final_churn,
                retained_users,
                retention_rate: retained_users as f64 / m.new_paid_users as f64,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;
    use crate::projection::project;
    use approx::assert_abs_diff_eq;

    fn cohorts(decay_rate: f64) -> Vec<CohortRetention> {
        let result = project(ParameterSet::default_scenario()).unwrap();
        cohort_retention(&result.months, &CohortConfig { decay_rate })
    }

    #[test]
    fn test_one_cohort_per_acquiring_month() {
        let all = cohorts(0.02);
        assert_eq!(all.len(), 36);
        assert_eq!(all[0].acquisition_month, 1);
        assert_eq!(all[0].initial_users, 19);
        assert_eq!(all[0].months_elapsed, 35);
    }

    #[test]
    fn test_latest_cohort_fully_retained() {
        let last = cohorts(0.02).pop().unwrap();
        assert_eq!(last.months_elapsed, 0);
        assert_eq!(last.retained_users, last.initial_users);
        assert_eq!(last.retention_rate, 1.0);
    }

    #[test]
    fn test_churn_ages_with_decay() {
        let first = &cohorts(0.02)[0];
        // 5% base plus 2% per year over 35 months
        assert_abs_diff_eq!(first.final_churn, 0.05 + 0.02 * 35.0 / 12.0, epsilon = 1e-12);
        let expected = (19.0 * (1.0 - first.final_churn).powi(35)).round() as u64;
        assert_eq!(first.retained_users, expected);
    }

    #[test]
    fn test_churn_capped() {
        let all = cohorts(0.5);
        assert!(all.iter().all(|c| c.final_churn <= MAX_COHORT_CHURN));
        assert_eq!(all[0].final_churn, MAX_COHORT_CHURN);
    }

    #[test]
    fn test_empty_sequence() {
        assert!(cohort_retention(&[], &CohortConfig { decay_rate: 0.02 }).is_empty());
    }
}
