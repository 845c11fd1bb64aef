//! Subscription pricing: single plan or tiered plans, with an annual-plan mix

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A paid tier in tiered pricing mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,

    /// Monthly list price
    pub price: f64,

    /// Fraction of the free pool converting to this tier each month
    pub conversion_rate: f64,
}

/// How paid users are billed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PricingModel {
    /// One paid plan at a monthly price
    Single { monthly_price: f64 },
    /// Independent tiers, each drawing from the same free pool
    Tiered(Vec<Tier>),
}

/// Pricing configuration shared by both models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub model: PricingModel,

    /// Discount on twelve months of the monthly price for annual billing
    pub annual_discount: f64,

    /// Share of paid users on annual billing
    pub annual_plan_share: f64,
}

impl Pricing {
    /// Single-plan pricing with no annual plans
    pub fn single(monthly_price: f64) -> Self {
        Self {
            model: PricingModel::Single { monthly_price },
            annual_discount: 0.0,
            annual_plan_share: 0.0,
        }
    }

    /// Effective annual price for a plan listed at `monthly_price`
    pub fn annual_price(&self, monthly_price: f64) -> f64 {
        monthly_price * 12.0 * (1.0 - self.annual_discount)
    }

    /// Split a paid pool into (monthly-billed, annual-billed) users
    pub fn split_plans(&self, paid_users: u64) -> (u64, u64) {
        let annual = ((paid_users as f64) * self.annual_plan_share).round() as u64;
        let annual = annual.min(paid_users);
        (paid_users - annual, annual)
    }

    /// Monthly revenue recognised from a pool of paid users on a plan
    pub fn plan_revenue(&self, monthly_price: f64, paid_users: u64) -> f64 {
        let (monthly_users, annual_users) = self.split_plans(paid_users);
        monthly_users as f64 * monthly_price
            + annual_users as f64 * self.annual_price(monthly_price) / 12.0
    }

    pub fn tiers(&self) -> &[Tier] {
        match &self.model {
            PricingModel::Tiered(tiers) => tiers,
            PricingModel::Single { .. } => &[],
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.model {
            PricingModel::Single { monthly_price } => {
                if !(*monthly_price > 0.0) {
                    return Err(ValidationError::InvalidPricing { price: *monthly_price });
                }
            }
            PricingModel::Tiered(tiers) => {
                if tiers.is_empty() {
                    return Err(ValidationError::MissingTiers);
                }
                for tier in tiers {
                    if !(tier.price >= 0.0) {
                        return Err(ValidationError::InvalidTier {
                            name: tier.name.clone(),
                            reason: format!("price must not be negative (got {})", tier.price),
                        });
                    }
                    if !(0.0..=1.0).contains(&tier.conversion_rate) {
                        return Err(ValidationError::InvalidTier {
                            name: tier.name.clone(),
                            reason: format!(
                                "conversion rate must be within [0, 1] (got {})",
                                tier.conversion_rate
                            ),
                        });
                    }
                }
            }
        }

        super::check_fraction("annual discount", self.annual_discount)?;
        super::check_fraction("annual plan share", self.annual_plan_share)?;
        Ok(())
    }
}

/// Revenue overlay from business customers, applied as a share of subscription revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bConfig {
    /// First operational month carrying the uplift
    pub start_month: u32,

    /// Uplift as a fraction of subscription revenue
    pub share: f64,
}

impl B2bConfig {
    pub fn uplift(&self, month: u32, subscription_revenue: f64) -> f64 {
        if month >= self.start_month {
            subscription_revenue * self.share
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pricing() -> Pricing {
        Pricing {
            model: PricingModel::Single { monthly_price: 9.99 },
            annual_discount: 0.15,
            annual_plan_share: 0.25,
        }
    }

    #[test]
    fn test_annual_price_applies_discount() {
        assert_abs_diff_eq!(pricing().annual_price(9.99), 101.898, epsilon = 1e-9);
    }

    #[test]
    fn test_plan_split_rounds_annual_share() {
        assert_eq!(pricing().split_plans(20), (15, 5));
        assert_eq!(pricing().split_plans(3), (2, 1));
        assert_eq!(pricing().split_plans(0), (0, 0));
    }

    #[test]
    fn test_plan_revenue_blends_monthly_and_annual() {
        let p = pricing();
        let expected = 15.0 * 9.99 + 5.0 * (9.99 * 12.0 * 0.85) / 12.0;
        assert_abs_diff_eq!(p.plan_revenue(9.99, 20), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_price_rejected_for_single_plan() {
        let p = Pricing::single(0.0);
        assert_eq!(p.validate(), Err(ValidationError::InvalidPricing { price: 0.0 }));
    }

    #[test]
    fn test_tiered_pricing_requires_tiers() {
        let p = Pricing {
            model: PricingModel::Tiered(vec![]),
            annual_discount: 0.0,
            annual_plan_share: 0.0,
        };
        assert_eq!(p.validate(), Err(ValidationError::MissingTiers));
    }

    #[test]
    fn test_free_tier_price_allowed() {
        let p = Pricing {
            model: PricingModel::Tiered(vec![Tier {
                name: "Starter".into(),
                price: 0.0,
                conversion_rate: 0.01,
            }]),
            annual_discount: 0.0,
            annual_plan_share: 0.0,
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_b2b_uplift_starts_at_configured_month() {
        let b2b = B2bConfig { start_month: 6, share: 0.2 };
        assert_eq!(b2b.uplift(5, 1000.0), 0.0);
        assert_abs_diff_eq!(b2b.uplift(6, 1000.0), 200.0);
    }
}
