use clap::Args;

use property_metrics_core::tax::fhl::{self, FhlTaxInput};
use property_metrics_core::tax::stamp_duty::{self, StampDutyInput};
use property_metrics_core::RateTables;

use super::CommandResult;
use crate::input::{self, Overrides};

/// Arguments for the FHL vs Section 24 comparison
#[derive(Args)]
pub struct FhlArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Tax bracket: basic, higher or additional
    #[arg(long)]
    pub bracket: Option<String>,

    /// Days available to let in the year
    #[arg(long)]
    pub days_available: Option<String>,

    /// Days actually let in the year
    #[arg(long)]
    pub days_let: Option<String>,
}

/// Arguments for residential stamp duty
#[derive(Args)]
pub struct StampDutyArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<String>,

    /// Buyer has never owned a home
    #[arg(long)]
    pub first_time_buyer: bool,

    /// Purchase is an additional dwelling
    #[arg(long)]
    pub additional_dwelling: bool,

    /// Buyer is not UK resident
    #[arg(long)]
    pub non_resident: bool,
}

pub fn run_fhl(args: FhlArgs, tables: &RateTables) -> CommandResult {
    let input: FhlTaxInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("tax_bracket", &args.bracket)
            .text("days_available", &args.days_available)
            .text("days_let", &args.days_let),
    )?;
    let result = fhl::derive_fhl_tax(&input, tables);
    Ok(serde_json::to_value(result)?)
}

pub fn run_stamp_duty(args: StampDutyArgs, tables: &RateTables) -> CommandResult {
    let input: StampDutyInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("price", &args.price)
            .flag("first_time_buyer", args.first_time_buyer)
            .flag("additional_dwelling", args.additional_dwelling)
            .flag("non_resident", args.non_resident),
    )?;
    let result = stamp_duty::derive_stamp_duty(&input, tables);
    Ok(serde_json::to_value(result)?)
}
