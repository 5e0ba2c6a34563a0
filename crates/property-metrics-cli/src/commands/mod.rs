pub mod finance;
pub mod lettings;
pub mod planning;
pub mod scenarios;
pub mod short_let;
pub mod tables;
pub mod tax;

use rust_decimal::Decimal;
use serde_json::Value;

use property_metrics_core::parse::{parse_money, parse_percent};
use property_metrics_core::scenarios::SweepRange;

pub type CommandResult = Result<Value, Box<dyn std::error::Error>>;

/// Comma-separated whole percents ("4.5,5,5.5%") as fractions.
pub fn parse_percent_list(raw: &str) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    raw.split(',')
        .map(|s| parse_percent(s).map_err(Into::into))
        .collect()
}

/// Semicolon- or space-separated amounts, so thousands separators survive
/// ("1,100;1,250").
pub fn parse_money_list(raw: &str) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    raw.split(';')
        .flat_map(|chunk| chunk.split(' '))
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_money(s).map_err(Into::into))
        .collect()
}

/// Comma-separated whole months.
pub fn parse_month_list(raw: &str) -> Result<Vec<u32>, Box<dyn std::error::Error>> {
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid month '{s}': {e}").into())
        })
        .collect()
}

/// `min:max:step` in whole percent, expanded to fractions.
pub fn parse_percent_range(
    raw: &str,
    field: &str,
) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Range must be min:max:step, got '{raw}'").into());
    }
    let range = SweepRange {
        min: parse_money(parts[0])?,
        max: parse_money(parts[1])?,
        step: parse_money(parts[2])?,
    };
    Ok(range
        .values(field)?
        .into_iter()
        .map(|v| v / Decimal::ONE_HUNDRED)
        .collect())
}

/// Sweep values from an explicit list, else a range, else the default range.
pub fn percent_values(
    list: &Option<String>,
    range: &Option<String>,
    default_range: &str,
    field: &str,
) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    match (list, range) {
        (Some(list), _) => parse_percent_list(list),
        (None, Some(range)) => parse_percent_range(range, field),
        (None, None) => parse_percent_range(default_range, field),
    }
}
