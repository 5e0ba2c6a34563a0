use clap::Args;

use property_metrics_core::finance::bridging::{self, BridgingInput};
use property_metrics_core::RateTables;

use super::CommandResult;
use crate::input::{self, Overrides};

/// Arguments for a retained vs rolled bridging comparison
#[derive(Args)]
pub struct BridgingArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross loan
    #[arg(long)]
    pub principal: Option<String>,

    /// Security value
    #[arg(long)]
    pub property_value: Option<String>,

    /// Monthly rate, whole percent (0.85 = 0.85% a month)
    #[arg(long)]
    pub monthly_rate: Option<String>,

    /// Term in months
    #[arg(long)]
    pub term: Option<String>,

    /// Month of redemption (defaults to the full term)
    #[arg(long)]
    pub exit_month: Option<String>,
}

pub fn run_bridging(args: BridgingArgs, tables: &RateTables) -> CommandResult {
    let input: BridgingInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("principal", &args.principal)
            .text("property_value", &args.property_value)
            .text("monthly_rate", &args.monthly_rate)
            .text("term_months", &args.term)
            .text("exit_month", &args.exit_month),
    )?;
    let result = bridging::derive_bridging(&input, tables);
    Ok(serde_json::to_value(result)?)
}
