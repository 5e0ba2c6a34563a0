use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PropertyMetricsError;
use crate::types::{Money, Rate};
use crate::PropertyMetricsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One band of a tiered schedule. `upper = None` marks the unbounded top band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band<T> {
    pub lower: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<Decimal>,
    pub value: T,
}

impl<T> Band<T> {
    pub fn new(lower: Decimal, upper: Option<Decimal>, value: T) -> Self {
        Band {
            lower,
            upper,
            value,
        }
    }

    /// Portion of `amount` that falls inside this band.
    fn slice_of(&self, amount: Decimal, is_top: bool) -> Decimal {
        if amount <= self.lower {
            return Decimal::ZERO;
        }
        let ceiling = match self.upper {
            Some(upper) if !is_top => amount.min(upper),
            _ => amount,
        };
        ceiling - self.lower
    }
}

/// Ordered, contiguous, strictly increasing bands.
///
/// Used for LTV rate bands, tax brackets, stamp duty and CIL instalment
/// policies. A value always resolves to exactly one band: the first whose
/// upper bound is at or above it, otherwise the last band.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule<T> {
    bands: Vec<Band<T>>,
}

/// A single marginal slice of a rate schedule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSlice {
    pub lower: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<Money>,
    pub rate: Rate,
    /// Amount of the base falling in this band
    pub taxable: Money,
    /// taxable * rate
    pub charge: Money,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<T> Schedule<T> {
    pub fn new(bands: Vec<Band<T>>) -> PropertyMetricsResult<Self> {
        if bands.is_empty() {
            return Err(PropertyMetricsError::InvalidSchedule(
                "a schedule needs at least one band".into(),
            ));
        }

        let last = bands.len() - 1;
        for (i, band) in bands.iter().enumerate() {
            match band.upper {
                Some(upper) if upper <= band.lower => {
                    return Err(PropertyMetricsError::InvalidSchedule(format!(
                        "band {i} upper bound {upper} is not above its lower bound {}",
                        band.lower
                    )));
                }
                None if i != last => {
                    return Err(PropertyMetricsError::InvalidSchedule(format!(
                        "band {i} is unbounded but is not the top band"
                    )));
                }
                _ => {}
            }

            if i < last {
                let next = &bands[i + 1];
                if band.upper != Some(next.lower) {
                    return Err(PropertyMetricsError::InvalidSchedule(format!(
                        "band {} does not start where band {i} ends (gap or overlap at {})",
                        i + 1,
                        next.lower
                    )));
                }
            }
        }

        Ok(Schedule { bands })
    }

    /// Compiled-in tables only; their ordering is covered by the tables tests.
    pub(crate) fn from_validated(bands: Vec<Band<T>>) -> Self {
        Schedule { bands }
    }

    pub fn bands(&self) -> &[Band<T>] {
        &self.bands
    }

    /// The band a value falls into.
    pub fn band_for(&self, value: Decimal) -> &Band<T> {
        self.bands
            .iter()
            .find(|band| band.upper.is_none_or(|upper| upper >= value))
            .unwrap_or_else(|| &self.bands[self.bands.len() - 1])
    }

    /// Shorthand for `band_for(value).value`.
    pub fn lookup(&self, value: Decimal) -> &T {
        &self.band_for(value).value
    }
}

// ---------------------------------------------------------------------------
// Marginal evaluation
// ---------------------------------------------------------------------------

impl Schedule<Rate> {
    /// Split `amount` into per-band slices, each charged at its band's rate.
    ///
    /// The top band is treated as unbounded, so slices always sum to the
    /// non-negative part of `amount`.
    pub fn slices(&self, amount: Money) -> Vec<BandSlice> {
        self.slices_with_surcharge(amount, Decimal::ZERO)
    }

    /// As [`Schedule::slices`], with `surcharge` added to every band's rate.
    pub fn slices_with_surcharge(&self, amount: Money, surcharge: Rate) -> Vec<BandSlice> {
        let last = self.bands.len() - 1;
        self.bands
            .iter()
            .enumerate()
            .map(|(i, band)| {
                let taxable = band.slice_of(amount, i == last);
                let rate = band.value + surcharge;
                BandSlice {
                    lower: band.lower,
                    upper: if i == last { None } else { band.upper },
                    rate,
                    taxable,
                    charge: taxable * rate,
                }
            })
            .collect()
    }

    /// Sum of the marginal charges on `amount`.
    pub fn marginal_total(&self, amount: Money) -> Money {
        self.slices(amount).iter().map(|s| s.charge).sum()
    }
}

// ---------------------------------------------------------------------------
// Serde: schedules travel as plain band lists and are re-validated on load
// ---------------------------------------------------------------------------

impl<T: Serialize> Serialize for Schedule<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bands.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Schedule<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bands = Vec::<Band<T>>::deserialize(deserializer)?;
        Schedule::new(bands).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn income_tax() -> Schedule<Rate> {
        Schedule::new(vec![
            Band::new(dec!(0), Some(dec!(12570)), dec!(0)),
            Band::new(dec!(12570), Some(dec!(50270)), dec!(0.20)),
            Band::new(dec!(50270), Some(dec!(125140)), dec!(0.40)),
            Band::new(dec!(125140), None, dec!(0.45)),
        ])
        .unwrap()
    }

    #[test]
    fn test_band_for_uses_first_upper_at_or_above() {
        let s = income_tax();
        assert_eq!(*s.lookup(dec!(12570)), dec!(0));
        assert_eq!(*s.lookup(dec!(12570.01)), dec!(0.20));
        assert_eq!(*s.lookup(dec!(1000000)), dec!(0.45));
    }

    #[test]
    fn test_bounded_top_band_treated_as_unbounded() {
        let s = Schedule::new(vec![
            Band::new(dec!(0), Some(dec!(0.60)), dec!(0.045)),
            Band::new(dec!(0.60), Some(dec!(0.75)), dec!(0.050)),
        ])
        .unwrap();
        assert_eq!(*s.lookup(dec!(0.90)), dec!(0.050));

        let slices = s.slices(dec!(2));
        let total: Decimal = slices.iter().map(|x| x.taxable).sum();
        assert_eq!(total, dec!(2));
    }

    #[test]
    fn test_marginal_total_known_answer() {
        // 12570 at 0 + 37700 at 20% + 9730 at 40% = 7540 + 3892 = 11432
        let s = income_tax();
        assert_eq!(s.marginal_total(dec!(60000)), dec!(11432));
    }

    #[test]
    fn test_slices_sum_to_amount() {
        let s = income_tax();
        let slices = s.slices(dec!(200000));
        let taxable: Decimal = slices.iter().map(|x| x.taxable).sum();
        assert_eq!(taxable, dec!(200000));
        assert!(slices.iter().all(|x| x.taxable >= Decimal::ZERO));
    }

    #[test]
    fn test_rejects_gap() {
        let err = Schedule::new(vec![
            Band::new(dec!(0), Some(dec!(100)), dec!(0)),
            Band::new(dec!(150), None, dec!(0.1)),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_inner_unbounded_and_inverted_band() {
        assert!(Schedule::new(vec![
            Band::new(dec!(0), None, dec!(0)),
            Band::new(dec!(100), None, dec!(0.1)),
        ])
        .is_err());
        assert!(Schedule::new(vec![Band::new(dec!(10), Some(dec!(5)), dec!(0))]).is_err());
        assert!(Schedule::<Rate>::new(vec![]).is_err());
    }

    #[test]
    fn test_serde_revalidates() {
        let ok: Schedule<Rate> =
            serde_json::from_str(r#"[{"lower":"0","upper":"100","value":"0"},{"lower":"100","value":"0.1"}]"#)
                .unwrap();
        assert_eq!(ok.bands().len(), 2);

        let bad: Result<Schedule<Rate>, _> =
            serde_json::from_str(r#"[{"lower":"0","upper":"100","value":"0"},{"lower":"90","value":"0.1"}]"#);
        assert!(bad.is_err());
    }
}
