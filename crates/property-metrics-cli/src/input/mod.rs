pub mod file;
pub mod stdin;
pub mod tables;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Field values given as individual flags. They win over the same field in
/// a file or piped record.
#[derive(Default)]
pub struct Overrides(Vec<(&'static str, Value)>);

impl Overrides {
    /// Raw text, left for the engine's lenient parsing ("£250,000", "5.5%").
    pub fn text(mut self, field: &'static str, value: &Option<String>) -> Self {
        if let Some(v) = value {
            self.0.push((field, Value::String(v.clone())));
        }
        self
    }

    pub fn flag(mut self, field: &'static str, set: bool) -> Self {
        if set {
            self.0.push((field, Value::Bool(true)));
        }
        self
    }
}

/// Resolve a command's input record from `--input`, else piped stdin, else
/// an empty record, then apply flag overrides.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
    overrides: Overrides,
) -> Result<T, Box<dyn std::error::Error>> {
    let mut value = match path {
        Some(p) => file::read_json_value(p)?,
        None => stdin::read_stdin()?.unwrap_or_else(|| Value::Object(Map::new())),
    };

    let Value::Object(map) = &mut value else {
        return Err("Input must be a JSON object".into());
    };
    for (field, v) in overrides.0 {
        map.insert(field.to_string(), v);
    }

    Ok(serde_json::from_value(value)?)
}
