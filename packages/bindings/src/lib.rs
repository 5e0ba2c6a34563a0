use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use property_metrics_core::finance::bridging::{self, BridgingInput};
use property_metrics_core::lettings::btl::{self, BtlInput};
use property_metrics_core::lettings::hmo;
use property_metrics_core::planning::{cil, development, loft};
use property_metrics_core::scenarios::{sensitivity, stress};
use property_metrics_core::short_let::serviced::{self, ServicedInput};
use property_metrics_core::tax::fhl::{self, FhlTaxInput};
use property_metrics_core::tax::stamp_duty;
use property_metrics_core::{RateTableProvider, RateTables};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn load_tables(tables_json: Option<&str>) -> NapiResult<RateTables> {
    match tables_json {
        Some(json) => RateTables::from_json(json).map_err(to_napi_error),
        None => Ok(RateTables::default()),
    }
}

/// Parse the input record, run one deriver, serialize the envelope.
fn derive<I, O>(
    input_json: &str,
    tables_json: Option<&str>,
    f: impl Fn(&I, &dyn RateTableProvider) -> O,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let tables = load_tables(tables_json)?;
    let output = f(&input, &tables);
    serde_json::to_string(&output).map_err(to_napi_error)
}

fn parse_values<V: DeserializeOwned>(values_json: &str) -> NapiResult<Vec<V>> {
    serde_json::from_str(values_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Lettings
// ---------------------------------------------------------------------------

#[napi]
pub fn btl_metrics(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, btl::derive_btl)
}

#[napi]
pub fn btl_metrics_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    derive(&input_json, Some(&tables_json), btl::derive_btl)
}

#[napi]
pub fn hmo_metrics(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, hmo::derive_hmo)
}

#[napi]
pub fn hmo_metrics_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    derive(&input_json, Some(&tables_json), hmo::derive_hmo)
}

// ---------------------------------------------------------------------------
// Bridging
// ---------------------------------------------------------------------------

#[napi]
pub fn bridging_metrics(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, bridging::derive_bridging)
}

#[napi]
pub fn bridging_metrics_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    derive(&input_json, Some(&tables_json), bridging::derive_bridging)
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[napi]
pub fn cil_liability(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, cil::derive_cil)
}

#[napi]
pub fn cil_liability_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    derive(&input_json, Some(&tables_json), cil::derive_cil)
}

#[napi]
pub fn loft_conversion(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, loft::derive_loft_conversion)
}

#[napi]
pub fn loft_conversion_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    derive(&input_json, Some(&tables_json), loft::derive_loft_conversion)
}

#[napi]
pub fn development_appraisal(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, development::derive_development_appraisal)
}

#[napi]
pub fn development_appraisal_with_tables(
    input_json: String,
    tables_json: String,
) -> NapiResult<String> {
    derive(
        &input_json,
        Some(&tables_json),
        development::derive_development_appraisal,
    )
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn fhl_tax(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, fhl::derive_fhl_tax)
}

#[napi]
pub fn fhl_tax_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    derive(&input_json, Some(&tables_json), fhl::derive_fhl_tax)
}

#[napi]
pub fn stamp_duty_land_tax(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, stamp_duty::derive_stamp_duty)
}

#[napi]
pub fn stamp_duty_land_tax_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    derive(&input_json, Some(&tables_json), stamp_duty::derive_stamp_duty)
}

// ---------------------------------------------------------------------------
// Short lets
// ---------------------------------------------------------------------------

#[napi]
pub fn serviced_accommodation(input_json: String) -> NapiResult<String> {
    derive(&input_json, None, serviced::derive_serviced_accommodation)
}

#[napi]
pub fn serviced_accommodation_with_tables(
    input_json: String,
    tables_json: String,
) -> NapiResult<String> {
    derive(
        &input_json,
        Some(&tables_json),
        serviced::derive_serviced_accommodation,
    )
}

// ---------------------------------------------------------------------------
// Scenarios: values arrive as a JSON array of fractions / months / keys
// ---------------------------------------------------------------------------

fn rate_stress(input_json: &str, rates_json: &str, tables_json: Option<&str>) -> NapiResult<String> {
    let rates: Vec<Decimal> = parse_values(rates_json)?;
    derive(input_json, tables_json, |input: &BtlInput, tables| {
        stress::btl_rate_stress(input, tables, &rates)
    })
}

#[napi]
pub fn btl_rate_stress(input_json: String, rates_json: String) -> NapiResult<String> {
    rate_stress(&input_json, &rates_json, None)
}

#[napi]
pub fn btl_rate_stress_with_tables(
    input_json: String,
    rates_json: String,
    tables_json: String,
) -> NapiResult<String> {
    rate_stress(&input_json, &rates_json, Some(&tables_json))
}

fn icr_stress(input_json: &str, rates_json: &str, tables_json: Option<&str>) -> NapiResult<String> {
    let rates: Vec<Decimal> = parse_values(rates_json)?;
    derive(input_json, tables_json, |input: &BtlInput, tables| {
        stress::btl_icr_stress(input, tables, &rates)
    })
}

#[napi]
pub fn btl_icr_stress(input_json: String, stress_rates_json: String) -> NapiResult<String> {
    icr_stress(&input_json, &stress_rates_json, None)
}

#[napi]
pub fn btl_icr_stress_with_tables(
    input_json: String,
    stress_rates_json: String,
    tables_json: String,
) -> NapiResult<String> {
    icr_stress(&input_json, &stress_rates_json, Some(&tables_json))
}

fn occupancy(input_json: &str, occupancies_json: &str, tables_json: Option<&str>) -> NapiResult<String> {
    let occupancies: Vec<Decimal> = parse_values(occupancies_json)?;
    derive(input_json, tables_json, |input: &ServicedInput, tables| {
        stress::occupancy_sweep(input, tables, &occupancies)
    })
}

#[napi]
pub fn occupancy_sweep(input_json: String, occupancies_json: String) -> NapiResult<String> {
    occupancy(&input_json, &occupancies_json, None)
}

#[napi]
pub fn occupancy_sweep_with_tables(
    input_json: String,
    occupancies_json: String,
    tables_json: String,
) -> NapiResult<String> {
    occupancy(&input_json, &occupancies_json, Some(&tables_json))
}

fn exit_sweep(input_json: &str, months_json: &str, tables_json: Option<&str>) -> NapiResult<String> {
    let months: Vec<u32> = parse_values(months_json)?;
    derive(input_json, tables_json, |input: &BridgingInput, tables| {
        stress::bridging_exit_sweep(input, tables, &months)
    })
}

#[napi]
pub fn bridging_exit_sweep(input_json: String, exit_months_json: String) -> NapiResult<String> {
    exit_sweep(&input_json, &exit_months_json, None)
}

#[napi]
pub fn bridging_exit_sweep_with_tables(
    input_json: String,
    exit_months_json: String,
    tables_json: String,
) -> NapiResult<String> {
    exit_sweep(&input_json, &exit_months_json, Some(&tables_json))
}

fn bracket_comparison(
    input_json: &str,
    brackets_json: &str,
    tables_json: Option<&str>,
) -> NapiResult<String> {
    let brackets: Vec<String> = parse_values(brackets_json)?;
    derive(input_json, tables_json, |input: &FhlTaxInput, tables| {
        stress::fhl_bracket_comparison(input, tables, &brackets)
    })
}

#[napi]
pub fn fhl_bracket_comparison(input_json: String, brackets_json: String) -> NapiResult<String> {
    bracket_comparison(&input_json, &brackets_json, None)
}

#[napi]
pub fn fhl_bracket_comparison_with_tables(
    input_json: String,
    brackets_json: String,
    tables_json: String,
) -> NapiResult<String> {
    bracket_comparison(&input_json, &brackets_json, Some(&tables_json))
}

fn sensitivity_grid(
    input_json: &str,
    rates_json: &str,
    rents_json: &str,
    tables_json: Option<&str>,
) -> NapiResult<String> {
    let rates: Vec<Decimal> = parse_values(rates_json)?;
    let rents: Vec<Decimal> = parse_values(rents_json)?;
    derive(input_json, tables_json, |input: &BtlInput, tables| {
        sensitivity::btl_sensitivity_grid(input, tables, &rates, &rents)
    })
}

/// Monthly BTL cashflow over interest rates (rows) and monthly rents (columns).
#[napi]
pub fn btl_sensitivity_grid(
    input_json: String,
    rates_json: String,
    rents_json: String,
) -> NapiResult<String> {
    sensitivity_grid(&input_json, &rates_json, &rents_json, None)
}

#[napi]
pub fn btl_sensitivity_grid_with_tables(
    input_json: String,
    rates_json: String,
    rents_json: String,
    tables_json: String,
) -> NapiResult<String> {
    sensitivity_grid(&input_json, &rates_json, &rents_json, Some(&tables_json))
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[napi]
pub fn default_rate_tables() -> NapiResult<String> {
    serde_json::to_string(&RateTables::default()).map_err(to_napi_error)
}
