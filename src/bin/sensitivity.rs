//! Growth/churn sensitivity grid around a scenario
//!
//! Usage: cargo run --bin sensitivity -- --inputs data/scenarios/baseline.json

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use subscription_projection::params::loader::{load_parameters, DEFAULT_INPUTS_PATH};
use subscription_projection::scenario::{ScenarioRunner, SensitivityPoint};

#[derive(Debug, Parser)]
#[command(name = "sensitivity", about = "Break-even and LTV:CAC across growth and churn multipliers")]
struct Args {
    #[arg(long, default_value = DEFAULT_INPUTS_PATH)]
    inputs: PathBuf,

    /// Growth rate multipliers
    #[arg(long, value_delimiter = ',', default_value = "0.5,0.75,1.0,1.25,1.5,2.0")]
    growth: Vec<f64>,

    /// Churn rate multipliers
    #[arg(long, value_delimiter = ',', default_value = "0.5,0.75,1.0,1.25,1.5")]
    churn: Vec<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (_, params) = load_parameters(&args.inputs, None, None)
        .with_context(|| format!("loading scenario from {}", args.inputs.display()))?;

    let start = Instant::now();
    let runner = ScenarioRunner::new(params);
    let grid = runner.sensitivity(&args.growth, &args.churn);
    println!("Ran {} scenarios in {:?}\n", grid.len(), start.elapsed());

    print_table("Break-even month", &args.churn, &grid, |point| match &point.result {
        Ok(result) => result
            .summary
            .break_even_month
            .map_or_else(|| "-".to_string(), |m| m.to_string()),
        Err(e) => format!("err: {}", e),
    });

    println!();
    print_table("LTV:CAC", &args.churn, &grid, |point| match &point.result {
        Ok(result) => format!("{:.2}", result.summary.unit_economics.ltv_cac_ratio),
        Err(_) => "err".to_string(),
    });

    Ok(())
}

fn print_table<F>(title: &str, churn: &[f64], grid: &[SensitivityPoint], cell: F)
where
    F: Fn(&SensitivityPoint) -> String,
{
    println!("{} (rows: growth x, columns: churn x)", title);
    print!("{:>8}", "");
    for c in churn {
        print!(" {:>10}", format!("{:.2}x", c));
    }
    println!();

    if churn.is_empty() {
        return;
    }
    for row in grid.chunks(churn.len()) {
        print!("{:>8}", format!("{:.2}x", row[0].growth_multiplier));
        for point in row {
            print!(" {:>10}", cell(point));
        }
        println!();
    }
}
