use clap::Args;

use property_metrics_core::short_let::serviced::{self, ServicedInput};
use property_metrics_core::RateTables;

use super::CommandResult;
use crate::input::{self, Overrides};

/// Arguments for serviced accommodation break-even
#[derive(Args)]
pub struct ServicedArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Average daily rate
    #[arg(long)]
    pub adr: Option<String>,

    /// Base occupancy, whole percent
    #[arg(long)]
    pub occupancy: Option<String>,

    /// Nights in the month (default 30)
    #[arg(long)]
    pub nights_per_month: Option<String>,
}

pub fn run_serviced(args: ServicedArgs, tables: &RateTables) -> CommandResult {
    let input: ServicedInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("adr", &args.adr)
            .text("base_occupancy_pct", &args.occupancy)
            .text("nights_per_month", &args.nights_per_month),
    )?;
    let result = serviced::derive_serviced_accommodation(&input, tables);
    Ok(serde_json::to_value(result)?)
}
