use clap::Args;

use property_metrics_core::lettings::btl::{self, BtlInput};
use property_metrics_core::lettings::hmo::{self, HmoInput};
use property_metrics_core::RateTables;

use super::CommandResult;
use crate::input::{self, Overrides};

/// Arguments for a single-let buy-to-let appraisal
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BtlArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<String>,

    /// Monthly rent
    #[arg(long)]
    pub rent: Option<String>,

    /// Deposit, whole percent
    #[arg(long)]
    pub deposit_pct: Option<String>,

    /// Annual mortgage rate, whole percent (omit to use the LTV band)
    #[arg(long)]
    pub rate: Option<String>,
}

/// Arguments for an HMO appraisal
#[derive(Args)]
pub struct HmoArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<String>,

    /// Number of lettable rooms
    #[arg(long)]
    pub rooms: Option<String>,

    /// Monthly rent per room
    #[arg(long)]
    pub rent_per_room: Option<String>,

    /// Annual mortgage rate, whole percent
    #[arg(long)]
    pub rate: Option<String>,
}

pub fn run_btl(args: BtlArgs, tables: &RateTables) -> CommandResult {
    let input: BtlInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("purchase_price", &args.price)
            .text("monthly_rent", &args.rent)
            .text("deposit_pct", &args.deposit_pct)
            .text("interest_rate", &args.rate),
    )?;
    let result = btl::derive_btl(&input, tables);
    Ok(serde_json::to_value(result)?)
}

pub fn run_hmo(args: HmoArgs, tables: &RateTables) -> CommandResult {
    let input: HmoInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("purchase_price", &args.price)
            .text("room_count", &args.rooms)
            .text("rent_per_room", &args.rent_per_room)
            .text("interest_rate", &args.rate),
    )?;
    let result = hmo::derive_hmo(&input, tables);
    Ok(serde_json::to_value(result)?)
}
