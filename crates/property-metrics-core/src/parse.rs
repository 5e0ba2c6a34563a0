//! Numeric normalization at the input boundary.
//!
//! Two layers live here:
//!
//! * strict parsers (`parse_money`, `parse_percent`) that return a typed
//!   [`PropertyMetricsError::Parse`] for anything they cannot read;
//! * lenient coercion (`coerce_*` and the [`lenient`] serde adapters) that
//!   degrades unreadable input to zero.
//!
//! Percentages are divided by 100 here and nowhere else. Every deriver works
//! in fractions.

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::error::PropertyMetricsError;
use crate::types::{Money, Rate};
use crate::PropertyMetricsResult;

/// Parse a currency-like string ("£1,250.50", "1250", "-£300").
///
/// Every character other than ASCII digits and `.` is stripped. A `-` that
/// appears before the first digit makes the value negative.
pub fn parse_money(raw: &str) -> PropertyMetricsResult<Money> {
    let trimmed = raw.trim();

    let negative = trimmed
        .chars()
        .take_while(|c| !c.is_ascii_digit() && *c != '.')
        .any(|c| c == '-');

    let digits: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return Err(PropertyMetricsError::Parse {
            input: raw.to_string(),
            reason: "no numeric content".into(),
        });
    }

    let value = Decimal::from_str(&digits).map_err(|e| PropertyMetricsError::Parse {
        input: raw.to_string(),
        reason: e.to_string(),
    })?;

    Ok(if negative { -value } else { value })
}

/// Parse a whole-percent string ("5.5", "5.5%") into a fraction (0.055).
pub fn parse_percent(raw: &str) -> PropertyMetricsResult<Rate> {
    parse_money(raw).map(percent_to_fraction)
}

/// Lenient currency parse: unreadable input becomes zero.
pub fn coerce_money(raw: &str) -> Money {
    match parse_money(raw) {
        Ok(v) => v,
        Err(e) => {
            debug!("coercing unparseable amount to zero: {e}");
            Decimal::ZERO
        }
    }
}

/// Lenient percentage parse: unreadable input becomes zero.
pub fn coerce_percent(raw: &str) -> Rate {
    percent_to_fraction(coerce_money(raw))
}

fn percent_to_fraction(pct: Decimal) -> Rate {
    pct / dec!(100)
}

fn fraction_to_percent(rate: Rate) -> Decimal {
    rate * dec!(100)
}

fn number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    let s = n.to_string();
    Decimal::from_str(&s)
        .ok()
        .or_else(|| Decimal::from_scientific(&s).ok())
}

/// Serde adapters for form-style input records.
///
/// Each field accepts a JSON number, a numeric string, `null` or a boolean.
/// Anything that cannot be read as a number becomes zero. Arrays and objects
/// are a structural mismatch and fail deserialization of the whole record.
pub mod lenient {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawField {
        Number(serde_json::Number),
        Text(String),
        Flag(bool),
        Missing(()),
    }

    impl RawField {
        fn is_missing(&self) -> bool {
            matches!(self, RawField::Missing(()))
        }

        fn into_decimal(self) -> Decimal {
            match self {
                RawField::Number(n) => number_to_decimal(&n).unwrap_or_else(|| {
                    debug!("coercing out-of-range number {n} to zero");
                    Decimal::ZERO
                }),
                RawField::Text(s) => coerce_money(&s),
                RawField::Flag(b) => {
                    debug!("coercing boolean {b} in numeric field to zero");
                    Decimal::ZERO
                }
                RawField::Missing(()) => Decimal::ZERO,
            }
        }

        fn into_count(self) -> u32 {
            self.into_decimal().trunc().to_u32().unwrap_or(0)
        }
    }

    /// Currency amount, kept as entered.
    pub mod money {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Decimal, s: S) -> Result<S::Ok, S::Error> {
            Serialize::serialize(value, s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
            RawField::deserialize(d).map(RawField::into_decimal)
        }
    }

    /// Whole percent on the wire, fraction in memory.
    pub mod percent {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Decimal, s: S) -> Result<S::Ok, S::Error> {
            Serialize::serialize(&fraction_to_percent(*value).normalize(), s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
            RawField::deserialize(d).map(|raw| percent_to_fraction(raw.into_decimal()))
        }
    }

    /// Optional percentage; `null` or a missing field stays `None`.
    pub mod optional_percent {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
            let whole = value.map(|v| fraction_to_percent(v).normalize());
            Serialize::serialize(&whole, s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
            let raw = RawField::deserialize(d)?;
            if raw.is_missing() {
                return Ok(None);
            }
            Ok(Some(percent_to_fraction(raw.into_decimal())))
        }
    }

    /// Optional currency amount.
    pub mod optional_money {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error> {
            value.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
            let raw = RawField::deserialize(d)?;
            if raw.is_missing() {
                return Ok(None);
            }
            Ok(Some(raw.into_decimal()))
        }
    }

    /// Non-negative whole count (rooms, months, days). Fractions truncate.
    pub mod count {
        use super::*;

        pub fn serialize<S: Serializer>(value: &u32, s: S) -> Result<S::Ok, S::Error> {
            value.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
            RawField::deserialize(d).map(RawField::into_count)
        }
    }

    pub mod optional_count {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
            value.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
            let raw = RawField::deserialize(d)?;
            if raw.is_missing() {
                return Ok(None);
            }
            Ok(Some(raw.into_count()))
        }
    }

    /// Optional year (i32), e.g. CIL charging year.
    pub mod optional_year {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<i32>, s: S) -> Result<S::Ok, S::Error> {
            value.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
            let raw = RawField::deserialize(d)?;
            if raw.is_missing() {
                return Ok(None);
            }
            Ok(Some(raw.into_decimal().trunc().to_i32().unwrap_or(0)))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Form {
        #[serde(default, with = "lenient::money")]
        price: Money,
        #[serde(default, with = "lenient::percent")]
        deposit_pct: Rate,
        #[serde(default, with = "lenient::optional_percent")]
        rate: Option<Rate>,
        #[serde(default, with = "lenient::count")]
        rooms: u32,
    }

    #[test]
    fn test_parse_money_strips_symbols() {
        assert_eq!(parse_money("£250,000").unwrap(), dec!(250000));
        assert_eq!(parse_money(" 1,234.56 ").unwrap(), dec!(1234.56));
        assert_eq!(parse_money("-£300").unwrap(), dec!(-300));
        assert_eq!(parse_money("£-300").unwrap(), dec!(-300));
    }

    #[test]
    fn test_parse_money_rejects_garbage() {
        assert!(parse_money("abc").is_err());
        assert!(parse_money("").is_err());
        assert!(parse_money("1.2.3").is_err());
    }

    #[test]
    fn test_parse_percent_divides_once() {
        assert_eq!(parse_percent("5.5%").unwrap(), dec!(0.055));
        assert_eq!(parse_percent("25").unwrap(), dec!(0.25));
    }

    #[test]
    fn test_coerce_degrades_to_zero() {
        assert_eq!(coerce_money("n/a"), Decimal::ZERO);
        assert_eq!(coerce_percent("ten"), Decimal::ZERO);
        assert_eq!(coerce_money("£1,200"), dec!(1200));
    }

    #[test]
    fn test_lenient_form_accepts_strings_and_numbers() {
        let form: Form = serde_json::from_str(
            r#"{"price": "£250,000", "deposit_pct": 25, "rate": "5.5", "rooms": "5"}"#,
        )
        .unwrap();
        assert_eq!(form.price, dec!(250000));
        assert_eq!(form.deposit_pct, dec!(0.25));
        assert_eq!(form.rate, Some(dec!(0.055)));
        assert_eq!(form.rooms, 5);
    }

    #[test]
    fn test_lenient_form_defaults_missing_and_garbage_to_zero() {
        let form: Form = serde_json::from_str(r#"{"price": "lots", "deposit_pct": null}"#).unwrap();
        assert_eq!(form.price, Decimal::ZERO);
        assert_eq!(form.deposit_pct, Decimal::ZERO);
        assert_eq!(form.rate, None);
        assert_eq!(form.rooms, 0);
    }

    #[test]
    fn test_lenient_form_rejects_structural_mismatch() {
        let result: Result<Form, _> = serde_json::from_str(r#"{"price": [1, 2]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_percent_serializes_back_as_whole_percent() {
        let form: Form = serde_json::from_str(r#"{"deposit_pct": 25, "rate": 5.5}"#).unwrap();
        let json = serde_json::to_string(&form).unwrap();
        let again: Form = serde_json::from_str(&json).unwrap();
        assert_eq!(again.deposit_pct, dec!(0.25));
        assert_eq!(again.rate, Some(dec!(0.055)));
    }

    #[test]
    fn test_money_serializes_as_entered() {
        let form: Form = serde_json::from_str(r#"{"price": "£250,000.50", "rooms": 4}"#).unwrap();
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["price"], serde_json::json!("250000.50"));
        assert_eq!(value["rooms"], serde_json::json!(4));
        let again: Form = serde_json::from_value(value).unwrap();
        assert_eq!(again.price, dec!(250000.50));
    }

    #[test]
    fn test_float_input_is_exact() {
        let form: Form = serde_json::from_str(r#"{"price": 0.1, "rate": 0.1}"#).unwrap();
        assert_eq!(form.price, dec!(0.1));
        assert_eq!(form.rate, Some(dec!(0.001)));
    }
}
