//! Core projection engine for monthly subscription business projections

use chrono::Months;
use log::{debug, info, warn};

use super::records::{CostBreakdown, MonthRecord, ProjectionResult, TierSnapshot};
use super::state::{apply_delta, round_users, ProjectionState};
use crate::error::ValidationError;
use crate::metrics::SummaryMetrics;
use crate::params::{ParameterSet, PricingModel, BETA_MONTHS, MAX_CONVERSION_RATE};

/// Users and revenue produced by the conversion step
struct ConversionOutcome {
    rate_displayed: f64,
    new_paid: u64,
    churned_paid: u64,
    revenue: f64,
    tiers: Vec<TierSnapshot>,
}

/// Main projection engine
///
/// Owns its parameter set; every call to [`project`](Self::project) starts
/// from a fresh state.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    params: ParameterSet,
}

impl ProjectionEngine {
    /// Create an engine, rejecting parameter sets that cannot be projected
    pub fn new(params: ParameterSet) -> Result<Self, ValidationError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Run the beta and every operational month, then derive summary metrics
    pub fn project(&self) -> ProjectionResult {
        let total_months = BETA_MONTHS + self.params.projection_months as usize;
        info!(
            "Projecting {} operational months ({} beta) from {} starting users",
            self.params.projection_months, BETA_MONTHS, self.params.starting_mau
        );

        let mut months = Vec::with_capacity(total_months);
        let mut state = ProjectionState::from_params(&self.params);

        self.seed_beta(&mut state, &mut months);

        for _month in 1..=self.params.projection_months {
            state.advance_month();
            let record = self.calculate_month(&mut state);
            months.push(record);
        }

        let summary = SummaryMetrics::derive(&months, &self.params);
        info!(
            "Projection complete: final MAU {}, final ARR {:.2}, break-even {:?}",
            summary.final_mau, summary.final_arr, summary.break_even_month
        );

        ProjectionResult { months, summary }
    }

    /// Emit the three pre-launch months
    ///
    /// Beta spend draws down cash but never enters operational totals, and
    /// the beta headcount does not carry into month 1.
    fn seed_beta(&self, state: &mut ProjectionState, months: &mut Vec<MonthRecord>) {
        for (i, beta) in self.params.beta.iter().enumerate() {
            let costs = CostBreakdown {
                team: beta.team,
                tech: beta.tech,
                marketing: beta.marketing,
                ..Default::default()
            };
            state.cash_balance -= beta.total_costs();

            let index = i as u32;
            debug!("Beta {}: {} users, costs {:.2}, cash {:.2}", index, beta.users, beta.total_costs(), state.cash_balance);
            months.push(MonthRecord::beta(
                index,
                self.beta_label(index),
                beta.users,
                costs,
                state.cash_balance,
            ));
        }
    }

    /// Simulate a single operational month
    fn calculate_month(&self, state: &mut ProjectionState) -> MonthRecord {
        let month = state.month;
        let year = state.year;
        let previous_mau = state.mau();

        // Growth enters at the top of the funnel, sized on last month's total MAU
        let target_growth_rate = self.params.growth.rate_for_year(year);
        let new_signups = (previous_mau as f64 * target_growth_rate).round() as i64;
        state.free_users = apply_delta(state.free_users, new_signups);

        // Free churn after growth
        let free_churn_rate = self.params.churn.effective_free_churn(year);
        let churned_free = round_users(state.free_users as f64 * free_churn_rate).min(state.free_users);
        state.free_users -= churned_free;

        let paid_churn_rate = self.params.churn.effective_paid_churn(year);
        let conversion = match &self.params.pricing.model {
            PricingModel::Single { monthly_price } => {
                self.convert_single(state, *monthly_price, paid_churn_rate)
            }
            PricingModel::Tiered(_) => self.convert_tiered(state, paid_churn_rate),
        };

        let subscription_revenue = conversion.revenue;
        let b2b_revenue = self
            .params
            .b2b
            .as_ref()
            .map(|b2b| b2b.uplift(month, subscription_revenue))
            .unwrap_or(0.0);
        let monthly_revenue = subscription_revenue + b2b_revenue;

        let mau = state.mau();
        let premium_users = state.total_paid();
        let (costs, in_marketing_phase) = self.calculate_costs(month, year, mau, premium_users, monthly_revenue);
        let monthly_costs = costs.total();
        let net_income = monthly_revenue - monthly_costs;

        let funding = self.params.funding.raised_in_month(month);
        state.cash_balance += funding + net_income;

        if state.record_net_income(net_income) {
            info!("Break-even reached in month {} (net income {:.2})", month, net_income);
        }
        if state.cash_balance < 0.0 && !state.cash_exhausted {
            state.cash_exhausted = true;
            warn!("Cash balance negative in month {}: {:.2}", month, state.cash_balance);
        }

        let realized_growth_rate = if previous_mau > 0 {
            (mau as f64 - previous_mau as f64) / previous_mau as f64
        } else {
            0.0
        };

        debug!(
            "Month {}: MAU {} (free {}, paid {}), revenue {:.2}, costs {:.2}, cash {:.2}",
            month, mau, state.free_users, premium_users, monthly_revenue, monthly_costs, state.cash_balance
        );

        MonthRecord {
            label: self.operational_label(month),
            month,
            year,
            is_beta: false,
            mau,
            free_users: state.free_users,
            premium_users,
            tiers: conversion.tiers,
            new_signups,
            churned_free_users: churned_free,
            new_paid_users: conversion.new_paid,
            churned_paid_users: conversion.churned_paid,
            target_growth_rate,
            realized_growth_rate,
            free_churn_rate,
            paid_churn_rate,
            conversion_rate_displayed: conversion.rate_displayed,
            subscription_revenue,
            b2b_revenue,
            monthly_revenue,
            arr: monthly_revenue * 12.0,
            costs,
            in_marketing_phase,
            monthly_costs,
            net_income,
            funding,
            cash_balance: state.cash_balance,
        }
    }

    /// Single plan: convert, accumulate, churn, then bill the plan mix
    fn convert_single(&self, state: &mut ProjectionState, monthly_price: f64, paid_churn_rate: f64) -> ConversionOutcome {
        let rate = self.params.conversion.rate_for_year(state.year);
        let new_paid = round_users(state.free_users as f64 * rate).min(state.free_users);
        state.free_users -= new_paid;

        state.paid_users = state.paid_users.saturating_add(new_paid);
        let churned_paid = round_users(state.paid_users as f64 * paid_churn_rate).min(state.paid_users);
        state.paid_users -= churned_paid;

        ConversionOutcome {
            rate_displayed: rate,
            new_paid,
            churned_paid,
            revenue: self.params.pricing.plan_revenue(monthly_price, state.paid_users),
            tiers: Vec::new(),
        }
    }

    /// Tiered plans: every tier draws from the same free pool independently
    fn convert_tiered(&self, state: &mut ProjectionState, paid_churn_rate: f64) -> ConversionOutcome {
        let tiers = self.params.pricing.tiers();
        let free_base = state.free_users as f64;

        let mut outcome = ConversionOutcome {
            rate_displayed: 0.0,
            new_paid: 0,
            churned_paid: 0,
            revenue: 0.0,
            tiers: Vec::with_capacity(tiers.len()),
        };

        let mut combined_rate = 0.0;
        for (tier, pool) in tiers.iter().zip(state.tier_users.iter_mut()) {
            combined_rate += tier.conversion_rate;

            let new_users = round_users(free_base * tier.conversion_rate);
            *pool = pool.saturating_add(new_users);
            let churned = round_users(*pool as f64 * paid_churn_rate).min(*pool);
            *pool -= churned;

            let revenue = self.params.pricing.plan_revenue(tier.price, *pool);
            outcome.new_paid = outcome.new_paid.saturating_add(new_users);
            outcome.churned_paid = outcome.churned_paid.saturating_add(churned);
            outcome.revenue += revenue;
            outcome.tiers.push(TierSnapshot {
                name: tier.name.clone(),
                users: *pool,
                new_users,
                churned_users: churned,
                revenue,
            });
        }

        let combined_rate = combined_rate.min(MAX_CONVERSION_RATE);
        let converted = round_users(free_base * combined_rate).min(state.free_users);
        state.free_users -= converted;
        outcome.rate_displayed = combined_rate;

        outcome
    }

    /// Fixed costs with escalations and phase overrides, plus optional variable costs
    fn calculate_costs(&self, month: u32, year: u32, mau: u64, paid_users: u64, revenue: f64) -> (CostBreakdown, bool) {
        let fixed = self.params.costs.fixed_costs(month, year);
        let mut costs = CostBreakdown {
            team: fixed.team,
            tech: fixed.tech,
            marketing: fixed.marketing,
            ..Default::default()
        };

        if let Some(vc) = &self.params.variable_costs {
            costs.infrastructure = vc.infra_cost_per_user * mau as f64;
            costs.support = vc.support_cost_per_user * paid_users as f64;
            costs.transaction_fees = vc.transaction_fee_rate * revenue;
        }

        (costs, fixed.in_marketing_phase)
    }

    fn operational_label(&self, month: u32) -> String {
        self.params
            .launch_date
            .and_then(|d| d.checked_add_months(Months::new(month - 1)))
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_else(|| format!("Month {}", month))
    }

    fn beta_label(&self, index: u32) -> String {
        self.params
            .launch_date
            .and_then(|d| d.checked_sub_months(Months::new(BETA_MONTHS as u32 - index)))
            .map(|d| format!("Beta {} ({})", index, d.format("%Y-%m")))
            .unwrap_or_else(|| format!("Beta {}", index))
    }
}

/// Validate a parameter set and run a projection
pub fn project(params: ParameterSet) -> Result<ProjectionResult, ValidationError> {
    Ok(ProjectionEngine::new(params)?.project())
}
