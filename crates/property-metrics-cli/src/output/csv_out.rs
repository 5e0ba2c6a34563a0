use serde_json::Value;
use std::io;

use super::{display_value, flatten, point_row};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                // Two-column CSV: field, value. Row lists are left to JSON output.
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in flatten(result).fields {
                    let _ = wtr.write_record([key.as_str(), &display_value(&val)]);
                }
            }
            Some(Value::Array(points)) => write_rows(&mut wtr, points),
            _ => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in flatten(map).fields {
                    let _ = wtr.write_record([key.as_str(), &display_value(&val)]);
                }
            }
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&display_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(first) = rows.first() else {
        return;
    };

    let headers: Vec<String> = point_row(first).into_iter().map(|(k, _)| k).collect();
    let _ = wtr.write_record(&headers);

    for item in rows {
        let row = point_row(item);
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| display_value(v))
                    .unwrap_or_default()
            })
            .collect();
        let _ = wtr.write_record(&cells);
    }
}
