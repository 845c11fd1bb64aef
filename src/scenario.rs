//! Scenario runner for batch and sensitivity projections
//!
//! Runs are independent: each one builds a fresh engine from its own
//! parameter set, so they fan out across threads with rayon.

use rayon::prelude::*;

use crate::error::ValidationError;
use crate::params::{GrowthSchedule, ParameterSet};
use crate::projection::{ProjectionEngine, ProjectionResult};

/// One cell of a growth/churn sensitivity grid
#[derive(Debug, Clone)]
pub struct SensitivityPoint {
    pub growth_multiplier: f64,
    pub churn_multiplier: f64,
    pub result: Result<ProjectionResult, ValidationError>,
}

/// Runs projections around a base parameter set
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(ParameterSet::default_scenario());
/// let grid = runner.sensitivity(&[0.8, 1.0, 1.2], &[0.8, 1.0, 1.2]);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base: ParameterSet,
}

impl ScenarioRunner {
    pub fn new(base: ParameterSet) -> Self {
        Self { base }
    }

    /// Project the base scenario
    pub fn run(&self) -> Result<ProjectionResult, ValidationError> {
        Ok(ProjectionEngine::new(self.base.clone())?.project())
    }

    /// Project many parameter sets in parallel, preserving input order
    pub fn run_scenarios(&self, scenarios: &[ParameterSet]) -> Vec<Result<ProjectionResult, ValidationError>> {
        scenarios
            .par_iter()
            .map(|params| Ok(ProjectionEngine::new(params.clone())?.project()))
            .collect()
    }

    /// Base scenario with growth and churn scaled, churn clamped to 100%
    pub fn adjusted(&self, growth_multiplier: f64, churn_multiplier: f64) -> ParameterSet {
        let mut params = self.base.clone();
        params.growth = GrowthSchedule::new(
            self.base.growth.rates().iter().map(|r| r * growth_multiplier).collect(),
        );
        params.churn.free_churn_rate = (params.churn.free_churn_rate * churn_multiplier).min(1.0);
        params.churn.paid_churn_rate = (params.churn.paid_churn_rate * churn_multiplier).min(1.0);
        params
    }

    /// Project every combination of growth and churn multipliers
    ///
    /// Points are ordered growth-major.
    pub fn sensitivity(&self, growth_multipliers: &[f64], churn_multipliers: &[f64]) -> Vec<SensitivityPoint> {
        let cells: Vec<(f64, f64)> = growth_multipliers
            .iter()
            .flat_map(|&g| churn_multipliers.iter().map(move |&c| (g, c)))
            .collect();

        cells
            .par_iter()
            .map(|&(growth_multiplier, churn_multiplier)| {
                let params = self.adjusted(growth_multiplier, churn_multiplier);
                SensitivityPoint {
                    growth_multiplier,
                    churn_multiplier,
                    result: ProjectionEngine::new(params).map(|engine| engine.project()),
                }
            })
            .collect()
    }

    pub fn base(&self) -> &ParameterSet {
        &self.base
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(ParameterSet::default_scenario())
    }
}
