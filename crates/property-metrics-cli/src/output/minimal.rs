use serde_json::Value;

use super::display_value;

/// Headline figure of each calculator, in lookup order.
const PRIORITY_KEYS: [&str; 11] = [
    "liability",
    "total",
    "fhl_advantage",
    "breakeven_occupancy",
    "residual_land_value",
    "roi",
    "viability",
    "crossover_month",
    "cheaper_at_exit",
    "monthly_cashflow",
    "icr",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object. Sweeps print one
/// `value: answer` line per point.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Array(points) = result_obj {
        for point in points {
            let swept = point.get("value").map(display_value).unwrap_or_default();
            let answer = point.get("result").unwrap_or(point);
            println!("{}: {}", swept, headline(answer));
        }
        return;
    }

    println!("{}", headline(result_obj));
}

fn headline(result: &Value) -> String {
    if let Value::Object(map) = result {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return display_value(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, display_value(val));
        }
    }

    display_value(result)
}
