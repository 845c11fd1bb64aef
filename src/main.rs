//! Subscription Projection CLI
//!
//! Runs a projection from a scenario file and prints the summary

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use subscription_projection::params::loader::{load_parameters, DEFAULT_INPUTS_PATH};
use subscription_projection::{MonthRecord, ProjectionEngine, ProjectionResult};

#[derive(Debug, Parser)]
#[command(name = "subscription_projection", about = "Monthly projection for a subscription business")]
struct Args {
    /// Scenario inputs (JSON)
    #[arg(long, default_value = DEFAULT_INPUTS_PATH)]
    inputs: PathBuf,

    /// Cost escalation table (CSV: month,team,tech,marketing)
    #[arg(long)]
    escalations: Option<PathBuf>,

    /// Marketing phase table (CSV: start_month,end_month,budget,strategy)
    #[arg(long)]
    phases: Option<PathBuf>,

    /// Override the number of operational months
    #[arg(long)]
    months: Option<u32>,

    /// Write monthly rows to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the full result as JSON instead of the text summary
    #[arg(long)]
    json: bool,
}

/// Flat monthly row for CSV output
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    label: &'a str,
    month: u32,
    year: u32,
    is_beta: bool,
    mau: u64,
    free_users: u64,
    premium_users: u64,
    new_signups: i64,
    churned_free_users: u64,
    new_paid_users: u64,
    churned_paid_users: u64,
    target_growth_rate: f64,
    realized_growth_rate: f64,
    conversion_rate: f64,
    subscription_revenue: f64,
    b2b_revenue: f64,
    monthly_revenue: f64,
    arr: f64,
    team: f64,
    tech: f64,
    marketing: f64,
    variable_costs: f64,
    monthly_costs: f64,
    net_income: f64,
    funding: f64,
    cash_balance: f64,
}

impl<'a> From<&'a MonthRecord> for CsvRow<'a> {
    fn from(m: &'a MonthRecord) -> Self {
        Self {
            label: &m.label,
            month: m.month,
            year: m.year,
            is_beta: m.is_beta,
            mau: m.mau,
            free_users: m.free_users,
            premium_users: m.premium_users,
            new_signups: m.new_signups,
            churned_free_users: m.churned_free_users,
            new_paid_users: m.new_paid_users,
            churned_paid_users: m.churned_paid_users,
            target_growth_rate: m.target_growth_rate,
            realized_growth_rate: m.realized_growth_rate,
            conversion_rate: m.conversion_rate_displayed,
            subscription_revenue: m.subscription_revenue,
            b2b_revenue: m.b2b_revenue,
            monthly_revenue: m.monthly_revenue,
            arr: m.arr,
            team: m.costs.team,
            tech: m.costs.tech,
            marketing: m.costs.marketing,
            variable_costs: m.costs.variable(),
            monthly_costs: m.monthly_costs,
            net_income: m.net_income,
            funding: m.funding,
            cash_balance: m.cash_balance,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (_, mut params) = load_parameters(
        &args.inputs,
        args.escalations.as_deref(),
        args.phases.as_deref(),
    )
    .with_context(|| format!("loading scenario from {}", args.inputs.display()))?;

    if let Some(months) = args.months {
        params.projection_months = months;
    }

    let result = ProjectionEngine::new(params)?.project();

    if let Some(path) = &args.output {
        write_csv(path, &result)?;
        eprintln!("Wrote {} months to {}", result.months.len(), path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    Ok(())
}

fn write_csv(path: &Path, result: &ProjectionResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for month in &result.months {
        writer.serialize(CsvRow::from(month))?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(result: &ProjectionResult) {
    println!("Subscription Projection v0.1.0");
    println!("==============================\n");

    println!("{:<16} {:>8} {:>8} {:>8} {:>12} {:>12} {:>14}",
        "Month", "MAU", "Free", "Paid", "Revenue", "Costs", "Cash");
    println!("{}", "-".repeat(84));
    for m in &result.months {
        println!("{:<16} {:>8} {:>8} {:>8} {:>12.2} {:>12.2} {:>14.2}",
            m.label, m.mau, m.free_users, m.premium_users,
            m.monthly_revenue, m.monthly_costs, m.cash_balance);
    }

    let s = &result.summary;
    println!();
    println!("Final MAU:          {}", s.final_mau);
    println!("Final paid users:   {}", s.final_paid_users);
    println!("Final ARR:          ${:.2}", s.final_arr);
    println!("Final cash:         ${:.2}", s.final_cash_balance);
    match s.break_even_month {
        Some(month) => println!("Break-even month:   {}", month),
        None => println!("Break-even month:   not reached"),
    }
    println!("Runway (months):    {}", s.runway_months);
    println!("Total revenue:      ${:.2}", s.total_revenue);
    println!("Total costs:        ${:.2}", s.total_costs);
    println!("Total profit:       ${:.2}", s.total_profit);

    let ue = &s.unit_economics;
    println!();
    println!("CAC:                ${:.2}", ue.cac);
    println!("ARPU:               ${:.2}", ue.avg_arpu);
    println!("LTV:                ${:.2}", ue.ltv);
    println!("LTV:CAC:            {:.2}", ue.ltv_cac_ratio);
    println!("Payback (months):   {:.1}", ue.payback_months);

    println!();
    println!("Exit valuation:     ${:.2}", s.exit.exit_valuation);
    println!("Investor return:    ${:.2} ({:.2}x)", s.exit.investor_return, s.exit.return_multiple);
    if let Some(irr) = s.exit.investor_irr {
        println!("Investor IRR:       {:.2}%", irr * 100.0);
    }

    if !s.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &s.warnings {
            println!("  - {}", warning);
        }
    }
}
