pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields of a result, nested objects flattened to dotted keys, plus
/// any lists of rows (schedules, bands, scenarios) found along the way.
pub struct Flattened {
    pub fields: Vec<(String, Value)>,
    pub lists: Vec<(String, Vec<Value>)>,
}

pub fn flatten(map: &Map<String, Value>) -> Flattened {
    let mut out = Flattened {
        fields: Vec::new(),
        lists: Vec::new(),
    };
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Flattened) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            Value::Array(rows) if rows.iter().any(Value::is_object) => {
                out.lists.push((name, rows.clone()));
            }
            _ => out.fields.push((name, val.clone())),
        }
    }
}

/// One row per sweep point: the swept value, then the point's scalar fields.
pub fn point_row(point: &Value) -> Vec<(String, Value)> {
    match point {
        Value::Object(map) => match (map.get("value"), map.get("result")) {
            (Some(value), Some(Value::Object(result))) => {
                let mut row = vec![("value".to_string(), value.clone())];
                row.extend(flatten(result).fields);
                row
            }
            _ => flatten(map).fields,
        },
        other => vec![("value".to_string(), other.clone())],
    }
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(display_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
