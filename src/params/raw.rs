//! Form-shaped raw inputs and their conversion into a [`ParameterSet`]
//!
//! Numeric fields accept numbers or numeric strings (`"16"`, `"16%"`,
//! `"1,200"`). Anything missing or unparseable falls back to zero or the
//! field's stated default; NaN never reaches the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{
    BetaMonth, B2bConfig, ChurnConfig, CohortConfig, ConversionConfig, CostEscalation,
    CostSchedule, FundingConfig, FundingRound, GrowthSchedule, MarketingPhase,
    MarketingStrategy, ParameterSet, Pricing, PricingModel, Tier, VariableCostConfig,
    YearlyCosts, BETA_MONTHS,
};
use crate::error::ValidationError;

const DEFAULT_STARTING_MAU: f64 = 1000.0;
const DEFAULT_PROJECTION_MONTHS: f64 = 36.0;
const DEFAULT_VALUATION_MULTIPLE: f64 = 5.0;
const DEFAULT_B2B_START_MONTH: f64 = 1.0;
const DEFAULT_COHORT_DECAY_PCT: f64 = 2.0;

/// Raw assumption values as entered by the operator
///
/// Percentage fields (`*_pct`) are in percent units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInputs {
    #[serde(deserialize_with = "lenient_number")]
    pub starting_mau: Option<f64>,

    // Pricing
    #[serde(deserialize_with = "lenient_number")]
    pub monthly_price: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub annual_discount_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub annual_plan_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub tiered_pricing: bool,
    pub tiers: Vec<RawTier>,

    // Growth, churn and conversion
    #[serde(deserialize_with = "lenient_numbers")]
    pub growth_pct: Vec<Option<f64>>,
    #[serde(deserialize_with = "lenient_number")]
    pub free_churn_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub paid_churn_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub churn_improvement_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub initial_conversion_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub conversion_growth_pct: Option<f64>,

    // Costs
    pub yearly_costs: Vec<RawCosts>,
    pub escalations: Vec<RawEscalation>,
    pub marketing_phases: Vec<RawMarketingPhase>,
    pub beta: Vec<RawBetaMonth>,

    // B2B
    #[serde(deserialize_with = "lenient_number")]
    pub b2b_start_month: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub b2b_pct: Option<f64>,

    // Variable costs
    #[serde(deserialize_with = "lenient_bool")]
    pub variable_costs: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub infra_cost_per_user: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub support_cost_per_user: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub transaction_fee_pct: Option<f64>,

    // Cohorts
    #[serde(deserialize_with = "lenient_bool")]
    pub cohort_tracking: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub cohort_decay_pct: Option<f64>,

    // Investment
    #[serde(deserialize_with = "lenient_number")]
    pub seed_investment: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub equity_offered_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub valuation_multiple: Option<f64>,
    pub funding_rounds: Vec<RawFundingRound>,

    #[serde(deserialize_with = "lenient_number")]
    pub projection_months: Option<f64>,
    #[serde(deserialize_with = "lenient_date")]
    pub launch_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTier {
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub conversion_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCosts {
    #[serde(deserialize_with = "lenient_number")]
    pub team: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub tech: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub marketing: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEscalation {
    #[serde(deserialize_with = "lenient_number")]
    pub month: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub team: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub tech: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub marketing: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMarketingPhase {
    #[serde(deserialize_with = "lenient_number")]
    pub start_month: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub end_month: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub budget: Option<f64>,
    pub strategy: Option<String>,
    /// Explicit multipliers; overrides `strategy` when non-empty
    #[serde(deserialize_with = "lenient_numbers")]
    pub curve: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBetaMonth {
    #[serde(deserialize_with = "lenient_number")]
    pub users: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub team: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub tech: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub marketing: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFundingRound {
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub month: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub equity_pct: Option<f64>,
}

impl RawEscalation {
    fn is_blank(&self) -> bool {
        self.month.is_none() && self.team.is_none() && self.tech.is_none() && self.marketing.is_none()
    }
}

impl RawMarketingPhase {
    fn is_blank(&self) -> bool {
        self.start_month.is_none() && self.end_month.is_none() && self.budget.is_none()
    }
}

/// Build a validated [`ParameterSet`] from raw form values
pub fn build_parameters(raw: &RawInputs) -> Result<ParameterSet, ValidationError> {
    let pricing = Pricing {
        model: if raw.tiered_pricing {
            PricingModel::Tiered(
                raw.tiers
                    .iter()
                    .enumerate()
                    .map(|(i, t)| Tier {
                        name: t
                            .name
                            .clone()
                            .filter(|n| !n.trim().is_empty())
                            .unwrap_or_else(|| format!("Tier {}", i + 1)),
                        price: or_zero(t.price),
                        conversion_rate: pct(t.conversion_pct),
                    })
                    .collect(),
            )
        } else {
            PricingModel::Single {
                monthly_price: or_zero(raw.monthly_price),
            }
        },
        annual_discount: pct(raw.annual_discount_pct),
        annual_plan_share: pct(raw.annual_plan_pct),
    };

    let costs = CostSchedule {
        yearly: raw
            .yearly_costs
            .iter()
            .map(|c| YearlyCosts::new(or_zero(c.team), or_zero(c.tech), or_zero(c.marketing)))
            .collect(),
        escalations: raw
            .escalations
            .iter()
            .filter(|e| !e.is_blank())
            .map(|e| CostEscalation {
                month: month(e.month, 0.0),
                team_delta: or_zero(e.team),
                tech_delta: or_zero(e.tech),
                marketing_delta: or_zero(e.marketing),
            })
            .collect(),
        marketing_phases: raw
            .marketing_phases
            .iter()
            .filter(|p| !p.is_blank())
            .map(marketing_phase)
            .collect::<Result<_, _>>()?,
    };

    let mut beta = [BetaMonth::default(); BETA_MONTHS];
    for (slot, b) in beta.iter_mut().zip(&raw.beta) {
        *slot = BetaMonth {
            users: count(b.users),
            team: or_zero(b.team),
            tech: or_zero(b.tech),
            marketing: or_zero(b.marketing),
        };
    }

    let b2b_share = pct(raw.b2b_pct);
    let params = ParameterSet {
        starting_mau: count(Some(raw.starting_mau.unwrap_or(DEFAULT_STARTING_MAU))),
        pricing,
        growth: GrowthSchedule::new(raw.growth_pct.iter().map(|g| pct(*g)).collect()),
        churn: ChurnConfig {
            free_churn_rate: pct(raw.free_churn_pct),
            paid_churn_rate: pct(raw.paid_churn_pct),
            improvement_per_year: pct(raw.churn_improvement_pct),
        },
        conversion: ConversionConfig {
            initial_rate: pct(raw.initial_conversion_pct),
            growth_per_year: pct(raw.conversion_growth_pct),
        },
        costs,
        beta,
        funding: FundingConfig {
            seed_investment: or_zero(raw.seed_investment),
            equity_offered: pct(raw.equity_offered_pct),
            valuation_multiple: raw.valuation_multiple.unwrap_or(DEFAULT_VALUATION_MULTIPLE),
            rounds: raw
                .funding_rounds
                .iter()
                .enumerate()
                .map(|(i, r)| FundingRound {
                    name: r.name.clone().unwrap_or_else(|| format!("Round {}", i + 1)),
                    month: month(r.month, 0.0),
                    amount: or_zero(r.amount),
                    equity: pct(r.equity_pct),
                })
                .collect(),
        },
        projection_months: month(raw.projection_months, DEFAULT_PROJECTION_MONTHS),
        launch_date: raw.launch_date,
        b2b: (b2b_share > 0.0).then(|| B2bConfig {
            start_month: month(raw.b2b_start_month, DEFAULT_B2B_START_MONTH),
            share: b2b_share,
        }),
        variable_costs: raw.variable_costs.then(|| VariableCostConfig {
            infra_cost_per_user: or_zero(raw.infra_cost_per_user),
            support_cost_per_user: or_zero(raw.support_cost_per_user),
            transaction_fee_rate: pct(raw.transaction_fee_pct),
        }),
        cohorts: raw.cohort_tracking.then(|| CohortConfig {
            decay_rate: pct(Some(raw.cohort_decay_pct.unwrap_or(DEFAULT_COHORT_DECAY_PCT))),
        }),
    };

    params.validate()?;
    Ok(params)
}

fn marketing_phase(raw: &RawMarketingPhase) -> Result<MarketingPhase, ValidationError> {
    let strategy = if !raw.curve.is_empty() {
        Some(MarketingStrategy::Custom(raw.curve.iter().map(|m| m.unwrap_or(1.0)).collect()))
    } else {
        raw.strategy.as_deref().map(MarketingStrategy::from_name).transpose()?
    };

    Ok(MarketingPhase {
        start_month: month(raw.start_month, 0.0),
        end_month: month(raw.end_month, 0.0),
        budget: or_zero(raw.budget),
        strategy,
    })
}

fn or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Percent units to a fraction
fn pct(value: Option<f64>) -> f64 {
    or_zero(value) / 100.0
}

/// Headcount, rounded and floored at zero
fn count(value: Option<f64>) -> u64 {
    or_zero(value).round().max(0.0) as u64
}

fn month(value: Option<f64>, default: f64) -> u32 {
    value.unwrap_or(default).round().clamp(0.0, u32::MAX as f64) as u32
}

fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .trim_end_matches('%')
            .replace(',', "")
            .trim()
            .parse::<f64>()
            .ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_number(&value))
}

fn lenient_numbers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Option<f64>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().map(parse_number).collect(),
        Value::Null => Vec::new(),
        single => vec![parse_number(&single)],
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1" | "checked"
        ),
        _ => false,
    })
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
                .ok()
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn reference_json() -> &'static str {
        r#"{
            "starting_mau": 1000,
            "monthly_price": "9.99",
            "annual_discount_pct": 15,
            "annual_plan_pct": "25%",
            "growth_pct": [16, 10, 6],
            "free_churn_pct": 20,
            "paid_churn_pct": 5,
            "initial_conversion_pct": 2,
            "yearly_costs": [
                {"team": 4500, "tech": 800, "marketing": 1200},
                {"team": "12,000", "tech": 1800, "marketing": 3500},
                {"team": 25000, "tech": 4000, "marketing": 8000}
            ],
            "beta": [{"users": 50, "team": 3000}, {"users": 150}],
            "seed_investment": 200000,
            "equity_offered_pct": 10
        }"#
    }

    #[test]
    fn test_build_normalises_percentages() {
        let raw: RawInputs = serde_json::from_str(reference_json()).unwrap();
        let params = build_parameters(&raw).unwrap();

        assert_eq!(params.starting_mau, 1000);
        assert_eq!(params.pricing.model, PricingModel::Single { monthly_price: 9.99 });
        assert_abs_diff_eq!(params.pricing.annual_discount, 0.15);
        assert_abs_diff_eq!(params.pricing.annual_plan_share, 0.25);
        assert_abs_diff_eq!(params.growth.rate_for_year(1), 0.16);
        assert_abs_diff_eq!(params.churn.free_churn_rate, 0.20);
        assert_abs_diff_eq!(params.conversion.initial_rate, 0.02);
        assert_eq!(params.costs.baseline(2).team, 12000.0);
        assert_abs_diff_eq!(params.funding.equity_offered, 0.10);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let raw: RawInputs = serde_json::from_str(reference_json()).unwrap();
        let params = build_parameters(&raw).unwrap();

        assert_eq!(params.projection_months, 36);
        assert_eq!(params.funding.valuation_multiple, 5.0);
        assert_eq!(params.beta[0].users, 50);
        assert_eq!(params.beta[0].team, 3000.0);
        assert_eq!(params.beta[1].team, 0.0);
        assert_eq!(params.beta[2], BetaMonth::default());
        assert!(params.b2b.is_none());
        assert!(params.variable_costs.is_none());
        assert!(params.cohorts.is_none());
    }

    #[test]
    fn test_garbage_numbers_fall_back_to_zero() {
        let raw: RawInputs = serde_json::from_str(
            r#"{"monthly_price": 12, "free_churn_pct": "abc", "paid_churn_pct": null, "growth_pct": ["x", 5]}"#,
        )
        .unwrap();
        let params = build_parameters(&raw).unwrap();

        assert_eq!(params.churn.free_churn_rate, 0.0);
        assert_eq!(params.churn.paid_churn_rate, 0.0);
        assert_eq!(params.growth.rates(), &[0.0, 0.05]);
    }

    #[test]
    fn test_missing_price_is_invalid_pricing() {
        let raw: RawInputs = serde_json::from_str(r#"{"monthly_price": "n/a"}"#).unwrap();
        assert_eq!(
            build_parameters(&raw).unwrap_err(),
            ValidationError::InvalidPricing { price: 0.0 }
        );
    }

    #[test]
    fn test_tiered_pricing_ignores_single_price() {
        let raw: RawInputs = serde_json::from_str(
            r#"{
                "tiered_pricing": "on",
                "tiers": [
                    {"name": "Basic", "price": 5, "conversion_pct": 1.5},
                    {"price": 15, "conversion_pct": 0.5}
                ]
            }"#,
        )
        .unwrap();
        let params = build_parameters(&raw).unwrap();
        let tiers = params.pricing.tiers();

        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[1].name, "Tier 2");
        assert_abs_diff_eq!(tiers[0].conversion_rate, 0.015);
    }

    #[test]
    fn test_optional_features_enabled_by_flags() {
        let raw: RawInputs = serde_json::from_str(
            r#"{
                "monthly_price": 10,
                "b2b_pct": 20,
                "b2b_start_month": 13,
                "variable_costs": true,
                "infra_cost_per_user": 0.05,
                "transaction_fee_pct": 2.9,
                "cohort_tracking": 1,
                "launch_date": "2025-03"
            }"#,
        )
        .unwrap();
        let params = build_parameters(&raw).unwrap();

        assert_eq!(params.b2b, Some(B2bConfig { start_month: 13, share: 0.2 }));
        assert_abs_diff_eq!(params.variable_costs.unwrap().transaction_fee_rate, 0.029);
        assert_abs_diff_eq!(params.cohorts.unwrap().decay_rate, 0.02);
        assert_eq!(params.launch_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let raw: RawInputs = serde_json::from_str(
            r#"{
                "monthly_price": 10,
                "escalations": [{}, {"month": 6, "team": 1500}],
                "marketing_phases": [{"strategy": ""}, {"start_month": 4, "end_month": 9, "budget": 2000, "strategy": "ramp"}]
            }"#,
        )
        .unwrap();
        let params = build_parameters(&raw).unwrap();

        assert_eq!(params.costs.escalations.len(), 1);
        assert_eq!(params.costs.marketing_phases.len(), 1);
        assert_eq!(params.costs.marketing_phases[0].strategy, Some(MarketingStrategy::Ramp));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let raw: RawInputs = serde_json::from_str(
            r#"{"monthly_price": 10, "marketing_phases": [{"start_month": 1, "end_month": 2, "budget": 10, "strategy": "guerrilla"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            build_parameters(&raw),
            Err(ValidationError::UnknownMarketingStrategy { .. })
        ));
    }

    #[test]
    fn test_churn_above_hundred_percent_rejected() {
        let raw: RawInputs =
            serde_json::from_str(r#"{"monthly_price": 10, "free_churn_pct": 140}"#).unwrap();
        assert!(matches!(
            build_parameters(&raw),
            Err(ValidationError::RateOutOfRange { field: "free churn rate", .. })
        ));
    }
}
