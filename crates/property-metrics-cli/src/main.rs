mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::finance::BridgingArgs;
use commands::lettings::{BtlArgs, HmoArgs};
use commands::planning::{CilArgs, DevelopmentArgs, LoftArgs};
use commands::scenarios::{
    BracketCompareArgs, ExitSweepArgs, OccupancySweepArgs, RateSweepArgs, SensitivityArgs,
};
use commands::short_let::ServicedArgs;
use commands::tax::{FhlArgs, StampDutyArgs};

/// UK property investment metrics
#[derive(Parser)]
#[command(
    name = "pmx",
    version,
    about = "UK property investment metrics",
    long_about = "A CLI for UK property investment appraisal with decimal precision. \
                  Covers buy-to-let and HMO yields, bridging finance, CIL, loft \
                  conversions, development appraisals, FHL vs Section 24 tax, stamp \
                  duty and serviced accommodation break-even, plus stress sweeps."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Rate tables file (JSON, or YAML by extension); defaults are compiled in
    #[arg(long, global = true)]
    tables: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Buy-to-let yield, cashflow, DSCR and ICR
    Btl(BtlArgs),
    /// HMO room-by-room viability
    Hmo(HmoArgs),
    /// Bridging loan: retained vs rolled interest
    Bridging(BridgingArgs),
    /// Community Infrastructure Levy with instalments
    Cil(CilArgs),
    /// Loft conversion cost and ROI
    Loft(LoftArgs),
    /// FHL vs Section 24 rental income tax
    Fhl(FhlArgs),
    /// Residential stamp duty land tax
    StampDuty(StampDutyArgs),
    /// Serviced accommodation break-even and occupancy scenarios
    Serviced(ServicedArgs),
    /// Residual development appraisal
    Development(DevelopmentArgs),
    /// BTL cashflow across contract interest rates
    RateStress(RateSweepArgs),
    /// BTL lender ICR across stress rates
    IcrStress(RateSweepArgs),
    /// Serviced accommodation cashflow across occupancy levels
    OccupancySweep(OccupancySweepArgs),
    /// Bridging cost across exit months
    ExitSweep(ExitSweepArgs),
    /// FHL vs Section 24 across tax brackets
    BracketCompare(BracketCompareArgs),
    /// 2-way BTL cashflow grid over rate and rent
    Sensitivity(SensitivityArgs),
    /// Print the active rate tables
    Tables,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("pmx {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let tables = match input::tables::load_tables(cli.tables.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: commands::CommandResult = match cli.command {
        Commands::Btl(args) => commands::lettings::run_btl(args, &tables),
        Commands::Hmo(args) => commands::lettings::run_hmo(args, &tables),
        Commands::Bridging(args) => commands::finance::run_bridging(args, &tables),
        Commands::Cil(args) => commands::planning::run_cil(args, &tables),
        Commands::Loft(args) => commands::planning::run_loft(args, &tables),
        Commands::Development(args) => commands::planning::run_development(args, &tables),
        Commands::Fhl(args) => commands::tax::run_fhl(args, &tables),
        Commands::StampDuty(args) => commands::tax::run_stamp_duty(args, &tables),
        Commands::Serviced(args) => commands::short_let::run_serviced(args, &tables),
        Commands::RateStress(args) => commands::scenarios::run_rate_stress(args, &tables),
        Commands::IcrStress(args) => commands::scenarios::run_icr_stress(args, &tables),
        Commands::OccupancySweep(args) => commands::scenarios::run_occupancy_sweep(args, &tables),
        Commands::ExitSweep(args) => commands::scenarios::run_exit_sweep(args, &tables),
        Commands::BracketCompare(args) => commands::scenarios::run_bracket_compare(args, &tables),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args, &tables),
        Commands::Tables => commands::tables::run_tables(&tables),
        Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
