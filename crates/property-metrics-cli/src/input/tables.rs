use log::info;
use property_metrics_core::RateTables;

use super::file;

/// Rate tables from `--tables` (JSON, or YAML by extension), else the
/// compiled-in defaults.
pub fn load_tables(path: Option<&str>) -> Result<RateTables, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(RateTables::default());
    };

    let (canonical, contents) = file::read_to_string(path)?;
    let is_yaml = canonical
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let tables = if is_yaml {
        let tables: RateTables = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
        tables.validate()?;
        tables
    } else {
        RateTables::from_json(&contents)?
    };

    info!("rate tables {} loaded from {}", tables.version, canonical.display());
    Ok(tables)
}
