//! Advisory checks on implausible assumptions or results

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::projection::MonthRecord;

/// A non-fatal advisory on a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Warning {
    /// LTV:CAC above 10
    OptimisticLtvCac { ratio: f64 },
    /// LTV:CAC above 30
    UnrealisticLtvCac { ratio: f64 },
    /// Monthly paid churn below 0.5%
    LowChurn { rate: f64 },
    /// Monthly conversion above 30%
    HighConversion { rate: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OptimisticLtvCac { ratio } => {
                write!(f, "LTV:CAC of {ratio:.1} is above 10; check acquisition cost assumptions")
            }
            Warning::UnrealisticLtvCac { ratio } => {
                write!(f, "LTV:CAC of {ratio:.1} is above 30 and unlikely to hold")
            }
            Warning::LowChurn { rate } => {
                write!(f, "monthly churn of {:.2}% is below 0.5%", rate * 100.0)
            }
            Warning::HighConversion { rate } => {
                write!(f, "monthly conversion of {:.1}% is above 30%", rate * 100.0)
            }
        }
    }
}

/// Collect advisories for a finished projection and log each one
///
/// Churn and conversion are checked against the rates in force in each
/// operational month, so yearly improvement and step-ups are included.
pub fn collect_warnings<'a, I>(months: I, ltv_cac_ratio: f64) -> Vec<Warning>
where
    I: IntoIterator<Item = &'a MonthRecord>,
{
    let mut warnings = Vec::new();

    if ltv_cac_ratio > 30.0 {
        warnings.push(Warning::UnrealisticLtvCac { ratio: ltv_cac_ratio });
    } else if ltv_cac_ratio > 10.0 {
        warnings.push(Warning::OptimisticLtvCac { ratio: ltv_cac_ratio });
    }

    let mut lowest_churn: Option<f64> = None;
    let mut highest_conversion: Option<f64> = None;
    for m in months.into_iter().filter(|m| m.is_operational()) {
        lowest_churn = Some(lowest_churn.map_or(m.paid_churn_rate, |r| r.min(m.paid_churn_rate)));
        highest_conversion = Some(
            highest_conversion.map_or(m.conversion_rate_displayed, |r| r.max(m.conversion_rate_displayed)),
        );
    }

    if let Some(rate) = lowest_churn.filter(|&r| r < 0.005) {
        warnings.push(Warning::LowChurn { rate });
    }
    if let Some(rate) = highest_conversion.filter(|&r| r > 0.30) {
        warnings.push(Warning::HighConversion { rate });
    }

    for w in &warnings {
        warn!("{}", w);
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParameterSet, PricingModel, Tier};
    use crate::projection::{project, ProjectionResult};
    use approx::assert_abs_diff_eq;

    fn run(params: ParameterSet) -> ProjectionResult {
        project(params).unwrap()
    }

    #[test]
    fn test_reference_scenario_is_quiet() {
        let result = run(ParameterSet::default_scenario());
        assert!(collect_warnings(&result.months, 3.0).is_empty());
    }

    #[test]
    fn test_ltv_cac_thresholds() {
        let result = run(ParameterSet::default_scenario());
        assert_eq!(
            collect_warnings(&result.months, 12.0),
            vec![Warning::OptimisticLtvCac { ratio: 12.0 }]
        );
        assert_eq!(
            collect_warnings(&result.months, 45.0),
            vec![Warning::UnrealisticLtvCac { ratio: 45.0 }]
        );
    }

    #[test]
    fn test_churn_and_conversion_advisories() {
        let mut params = ParameterSet::default_scenario();
        params.churn.paid_churn_rate = 0.002;
        params.conversion.initial_rate = 0.35;
        let warnings = collect_warnings(&run(params).months, 0.0);

        assert!(warnings.contains(&Warning::LowChurn { rate: 0.002 }));
        assert!(warnings.contains(&Warning::HighConversion { rate: 0.35 }));
        assert!(warnings[0].to_string().contains("0.20%"));
    }

    #[test]
    fn test_conversion_stepping_up_past_threshold() {
        // 2% doubling each year reaches 64% in year 6
        let mut params = ParameterSet::default_scenario();
        params.conversion.growth_per_year = 1.0;
        params.projection_months = 72;
        let result = run(params);

        let rate = result
            .summary
            .warnings
            .iter()
            .find_map(|w| match w {
                Warning::HighConversion { rate } => Some(*rate),
                _ => None,
            })
            .unwrap();
        assert_abs_diff_eq!(rate, 0.64, epsilon = 1e-12);
    }

    #[test]
    fn test_churn_improving_to_zero() {
        let mut params = ParameterSet::default_scenario();
        params.churn.improvement_per_year = 0.5;
        let result = run(params);

        assert!(result
            .summary
            .warnings
            .contains(&Warning::LowChurn { rate: 0.0 }));
    }

    #[test]
    fn test_tiered_conversion_uses_combined_rate() {
        let mut params = ParameterSet::default_scenario();
        params.pricing.model = PricingModel::Tiered(vec![
            Tier { name: "Basic".into(), price: 5.0, conversion_rate: 0.2 },
            Tier { name: "Pro".into(), price: 15.0, conversion_rate: 0.15 },
        ]);
        let warnings = collect_warnings(&run(params).months, 0.0);

        assert!(warnings.iter().any(|w| matches!(
            w,
            Warning::HighConversion { rate } if (rate - 0.35).abs() < 1e-12
        )));
    }

    #[test]
    fn test_no_operational_months() {
        let months: Vec<MonthRecord> = Vec::new();
        assert!(collect_warnings(&months, 0.0).is_empty());
    }
}
