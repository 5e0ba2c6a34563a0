use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lettings::btl::{derive_btl, BtlInput};
use crate::tables::RateTableProvider;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

/// Two-way grid of a single output metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub row_variable: String,
    pub column_variable: String,
    pub output_metric: String,
    pub row_values: Vec<Decimal>,
    pub column_values: Vec<Decimal>,
    /// matrix[i][j] = metric at row_values[i], column_values[j]
    pub matrix: Vec<Vec<Decimal>>,
    /// Cell nearest the unmodified input
    pub base_case_position: (usize, usize),
    pub base_case_value: Decimal,
}

/// Find the closest index to a target value.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Monthly BTL cashflow across interest rates (rows) and monthly rents (columns).
pub fn btl_sensitivity_grid(
    input: &BtlInput,
    tables: &dyn RateTableProvider,
    rates: &[Rate],
    rents: &[Money],
) -> ComputationOutput<SensitivityGrid> {
    trace!("btl_sensitivity_grid: {}x{}", rates.len(), rents.len());
    let mut warnings: Vec<String> = Vec::new();

    let matrix: Vec<Vec<Decimal>> = rates
        .iter()
        .map(|rate| {
            rents
                .iter()
                .map(|rent| {
                    let mut scenario = input.clone();
                    scenario.interest_rate = Some(*rate);
                    scenario.monthly_rent = *rent;
                    derive_btl(&scenario, tables).result.financing.monthly_cashflow
                })
                .collect()
        })
        .collect();

    let base_rate = input
        .interest_rate
        .unwrap_or_else(|| derive_btl(input, tables).result.financing.interest_rate);
    let base_row = closest_index(rates, base_rate);
    let base_col = closest_index(rents, input.monthly_rent);
    let base_case_value = matrix
        .get(base_row)
        .and_then(|row| row.get(base_col))
        .copied()
        .unwrap_or(Decimal::ZERO);

    if rates.is_empty() || rents.is_empty() {
        warnings.push("Empty sweep axis — grid has no cells".into());
    }

    let output = SensitivityGrid {
        row_variable: "interest_rate".into(),
        column_variable: "monthly_rent".into(),
        output_metric: "monthly_cashflow".into(),
        row_values: rates.to_vec(),
        column_values: rents.to_vec(),
        matrix,
        base_case_position: (base_row, base_col),
        base_case_value,
    };

    with_metadata(
        "2-Way Sensitivity: BTL Monthly Cashflow",
        input,
        warnings,
        tables.version(),
        output,
    )
}
