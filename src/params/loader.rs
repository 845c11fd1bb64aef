//! Scenario input loader
//!
//! Reads raw assumptions from JSON and optional cost escalation and marketing
//! phase tables from CSV files in data/scenarios/

use std::fs::File;
use std::path::Path;

use csv::Reader;

use super::raw::{RawEscalation, RawInputs, RawMarketingPhase};
use super::{build_parameters, ParameterSet};
use crate::error::LoadError;

/// Default scenario inputs
pub const DEFAULT_INPUTS_PATH: &str = "data/scenarios/baseline.json";

/// Default cost escalation table
pub const DEFAULT_ESCALATIONS_PATH: &str = "data/scenarios/escalations.csv";

/// Default marketing phase table
pub const DEFAULT_PHASES_PATH: &str = "data/scenarios/marketing_phases.csv";

/// Escalation CSV columns: month,team,tech,marketing
#[derive(Debug, serde::Deserialize)]
struct EscalationRow {
    month: u32,
    #[serde(default)]
    team: f64,
    #[serde(default)]
    tech: f64,
    #[serde(default)]
    marketing: f64,
}

/// Phase CSV columns: start_month,end_month,budget,strategy
#[derive(Debug, serde::Deserialize)]
struct PhaseRow {
    start_month: u32,
    end_month: u32,
    budget: f64,
    strategy: Option<String>,
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Load raw inputs from a JSON file
pub fn load_raw_inputs(path: &Path) -> Result<RawInputs, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: display(path),
        source,
    })?;
    serde_json::from_reader(file).map_err(|source| LoadError::Json {
        path: display(path),
        source,
    })
}

/// Load cost escalations from a CSV file
pub fn load_escalations(path: &Path) -> Result<Vec<RawEscalation>, LoadError> {
    let mut reader = Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: display(path),
        source,
    })?;

    let mut escalations = Vec::new();
    for result in reader.deserialize() {
        let row: EscalationRow = result.map_err(|source| LoadError::Csv {
            path: display(path),
            source,
        })?;
        escalations.push(RawEscalation {
            month: Some(row.month as f64),
            team: Some(row.team),
            tech: Some(row.tech),
            marketing: Some(row.marketing),
        });
    }

    Ok(escalations)
}

/// Load marketing phases from a CSV file
pub fn load_marketing_phases(path: &Path) -> Result<Vec<RawMarketingPhase>, LoadError> {
    let mut reader = Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: display(path),
        source,
    })?;

    let mut phases = Vec::new();
    for result in reader.deserialize() {
        let row: PhaseRow = result.map_err(|source| LoadError::Csv {
            path: display(path),
            source,
        })?;
        phases.push(RawMarketingPhase {
            start_month: Some(row.start_month as f64),
            end_month: Some(row.end_month as f64),
            budget: Some(row.budget),
            strategy: row.strategy,
            curve: Vec::new(),
        });
    }

    Ok(phases)
}

/// Load inputs plus optional CSV tables and build a validated parameter set
///
/// Rows from the CSV tables are appended to any escalations or phases
/// already present in the JSON inputs.
pub fn load_parameters(
    inputs: &Path,
    escalations: Option<&Path>,
    phases: Option<&Path>,
) -> Result<(RawInputs, ParameterSet), LoadError> {
    let mut raw = load_raw_inputs(inputs)?;

    if let Some(path) = escalations {
        raw.escalations.extend(load_escalations(path)?);
    }
    if let Some(path) = phases {
        raw.marketing_phases.extend(load_marketing_phases(path)?);
    }

    let params = build_parameters(&raw)?;
    Ok((raw, params))
}

/// Load the default baseline scenario without CSV tables
pub fn load_default_scenario() -> Result<ParameterSet, LoadError> {
    load_parameters(Path::new(DEFAULT_INPUTS_PATH), None, None).map(|(_, params)| params)
}
