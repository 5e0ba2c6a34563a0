use clap::Args;

use property_metrics_core::finance::bridging::BridgingInput;
use property_metrics_core::lettings::btl::BtlInput;
use property_metrics_core::scenarios::{sensitivity, stress};
use property_metrics_core::short_let::serviced::ServicedInput;
use property_metrics_core::tax::fhl::FhlTaxInput;
use property_metrics_core::RateTables;

use super::{parse_money_list, parse_month_list, parse_percent_list, percent_values, CommandResult};
use crate::input::{self, Overrides};

/// Arguments for sweeping one rate over a BTL input
#[derive(Args)]
pub struct RateSweepArgs {
    /// Path to JSON BTL input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated whole percents, e.g. "4.5,5.5,6.5"
    #[arg(long)]
    pub rates: Option<String>,

    /// Whole-percent range min:max:step, e.g. "4:8:0.5"
    #[arg(long)]
    pub range: Option<String>,
}

/// Arguments for a serviced accommodation occupancy sweep
#[derive(Args)]
pub struct OccupancySweepArgs {
    /// Path to JSON serviced accommodation input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated whole-percent occupancies
    #[arg(long, default_value = "40,50,60,70,80")]
    pub occupancies: String,
}

/// Arguments for a bridging exit-month sweep
#[derive(Args)]
pub struct ExitSweepArgs {
    /// Path to JSON bridging input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated exit months (defaults to every month of the term)
    #[arg(long)]
    pub months: Option<String>,
}

/// Arguments for FHL vs Section 24 across tax brackets
#[derive(Args)]
pub struct BracketCompareArgs {
    /// Path to JSON FHL input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated bracket keys
    #[arg(long, default_value = "basic,higher,additional")]
    pub brackets: String,
}

/// Arguments for a 2-way BTL cashflow grid
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON BTL input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated whole-percent interest rates (rows)
    #[arg(long)]
    pub rates: String,

    /// Semicolon-separated monthly rents (columns), e.g. "1,100;1,200;1,300"
    #[arg(long)]
    pub rents: String,
}

pub fn run_rate_stress(args: RateSweepArgs, tables: &RateTables) -> CommandResult {
    let input: BtlInput = input::load(args.input.as_deref(), Overrides::default())?;
    let rates = percent_values(&args.rates, &args.range, "3:8:0.5", "interest_rate")?;
    Ok(serde_json::to_value(stress::btl_rate_stress(&input, tables, &rates))?)
}

pub fn run_icr_stress(args: RateSweepArgs, tables: &RateTables) -> CommandResult {
    let input: BtlInput = input::load(args.input.as_deref(), Overrides::default())?;
    let rates = percent_values(&args.rates, &args.range, "5:8:0.5", "stress_rate")?;
    Ok(serde_json::to_value(stress::btl_icr_stress(&input, tables, &rates))?)
}

pub fn run_occupancy_sweep(args: OccupancySweepArgs, tables: &RateTables) -> CommandResult {
    let input: ServicedInput = input::load(args.input.as_deref(), Overrides::default())?;
    let occupancies = parse_percent_list(&args.occupancies)?;
    Ok(serde_json::to_value(stress::occupancy_sweep(
        &input,
        tables,
        &occupancies,
    ))?)
}

pub fn run_exit_sweep(args: ExitSweepArgs, tables: &RateTables) -> CommandResult {
    let input: BridgingInput = input::load(args.input.as_deref(), Overrides::default())?;
    let months = match &args.months {
        Some(list) => parse_month_list(list)?,
        None => (1..=input.term_months).collect(),
    };
    Ok(serde_json::to_value(stress::bridging_exit_sweep(
        &input, tables, &months,
    ))?)
}

pub fn run_bracket_compare(args: BracketCompareArgs, tables: &RateTables) -> CommandResult {
    let input: FhlTaxInput = input::load(args.input.as_deref(), Overrides::default())?;
    let brackets: Vec<String> = args
        .brackets
        .split(',')
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    Ok(serde_json::to_value(stress::fhl_bracket_comparison(
        &input, tables, &brackets,
    ))?)
}

pub fn run_sensitivity(args: SensitivityArgs, tables: &RateTables) -> CommandResult {
    let input: BtlInput = input::load(args.input.as_deref(), Overrides::default())?;
    let rates = parse_percent_list(&args.rates)?;
    let rents = parse_money_list(&args.rents)?;
    Ok(serde_json::to_value(sensitivity::btl_sensitivity_grid(
        &input, tables, &rates, &rents,
    ))?)
}
