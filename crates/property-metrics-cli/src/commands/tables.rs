use property_metrics_core::RateTables;

use super::CommandResult;

/// Dump the active rate tables, e.g. as a starting point for `--tables`.
pub fn run_tables(tables: &RateTables) -> CommandResult {
    Ok(serde_json::to_value(tables)?)
}
