use clap::Args;

use property_metrics_core::planning::cil::{self, CilInput};
use property_metrics_core::planning::development::{self, DevelopmentInput};
use property_metrics_core::planning::loft::{self, LoftConversionInput};
use property_metrics_core::RateTables;

use super::CommandResult;
use crate::input::{self, Overrides};

/// Arguments for a Community Infrastructure Levy calculation
#[derive(Args)]
pub struct CilArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Charging authority, e.g. camden
    #[arg(long)]
    pub authority: Option<String>,

    /// Charging zone, e.g. zone_a
    #[arg(long)]
    pub zone: Option<String>,

    /// Gross internal area of the development, sqm
    #[arg(long)]
    pub gross_area: Option<String>,

    /// Commencement date (YYYY-MM-DD) for instalment due dates
    #[arg(long)]
    pub commencement: Option<String>,
}

/// Arguments for a loft conversion ROI
#[derive(Args)]
pub struct LoftArgs {
    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Current property value
    #[arg(long)]
    pub value: Option<String>,

    /// New floor area, sqm
    #[arg(long)]
    pub area: Option<String>,

    /// velux, dormer, hip_to_gable or mansard
    #[arg(long)]
    pub kind: Option<String>,

    /// Region for the build cost multiplier
    #[arg(long)]
    pub region: Option<String>,
}

/// Arguments for a residual development appraisal
#[derive(Args)]
pub struct DevelopmentArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Gross development value
    #[arg(long)]
    pub gdv: Option<String>,

    /// Land price
    #[arg(long)]
    pub land_price: Option<String>,
}

pub fn run_cil(args: CilArgs, tables: &RateTables) -> CommandResult {
    let input: CilInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("authority", &args.authority)
            .text("zone", &args.zone)
            .text("gross_area_sqm", &args.gross_area)
            .text("commencement_date", &args.commencement),
    )?;
    let result = cil::derive_cil(&input, tables);
    Ok(serde_json::to_value(result)?)
}

pub fn run_loft(args: LoftArgs, tables: &RateTables) -> CommandResult {
    let input: LoftConversionInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("property_value", &args.value)
            .text("floor_area_sqm", &args.area)
            .text("conversion_type", &args.kind)
            .text("region", &args.region),
    )?;
    let result = loft::derive_loft_conversion(&input, tables);
    Ok(serde_json::to_value(result)?)
}

pub fn run_development(args: DevelopmentArgs, tables: &RateTables) -> CommandResult {
    let input: DevelopmentInput = input::load(
        args.input.as_deref(),
        Overrides::default()
            .text("gdv", &args.gdv)
            .text("land_price", &args.land_price),
    )?;
    let result = development::derive_development_appraisal(&input, tables);
    Ok(serde_json::to_value(result)?)
}
