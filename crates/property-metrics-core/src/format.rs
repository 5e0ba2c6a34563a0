//! Display formatting. Lossy by nature, so only used at the output boundary.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Money, Multiple, Rate};

/// Round to whole pence, halves away from zero.
pub fn to_pence(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `£1,234.56`, `-£300.00`
pub fn gbp(value: Money) -> String {
    let rounded = to_pence(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}£{}.{frac}", group_thousands(whole))
}

/// `0.0576` → `5.76%`
pub fn percent(rate: Rate) -> String {
    let pct = (rate * dec!(100)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{pct:.2}%")
}

/// `1.456` → `1.46x`
pub fn ratio(value: Multiple) -> String {
    format!(
        "{:.2}x",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole pounds, handy for headline figures.
pub fn gbp_whole(value: Money) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}£{}", group_thousands(&rounded.abs().to_string()))
}
