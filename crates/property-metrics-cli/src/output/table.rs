use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{display_value, flatten, point_row};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            match map.get("result") {
                Some(Value::Object(result)) => print_result_table(result),
                Some(Value::Array(points)) => print_rows(points),
                _ => print_fields(&flatten(map).fields),
            }
            print_envelope(map);
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &serde_json::Map<String, Value>) {
    let flat = flatten(result);
    print_fields(&flat.fields);
    for (name, rows) in &flat.lists {
        println!("\n{}:", name);
        print_rows(rows);
    }
}

fn print_fields(fields: &[(String, Value)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.clone(), display_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let flattened: Vec<Vec<(String, Value)>> = rows.iter().map(point_row).collect();
    let headers: Vec<String> = flattened[0].iter().map(|(k, _)| k.clone()).collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in &flattened {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| display_value(v))
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(cells);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
