//! What-if utilities layered over the derivers.
//!
//! Every sweep clones the base input per point and overrides exactly one
//! field, so the caller's input is never mutated and points come back in the
//! order the values were given.

pub mod sensitivity;
pub mod stress;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PropertyMetricsError;
use crate::PropertyMetricsResult;

/// One evaluated point of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPoint<V, O> {
    pub value: V,
    pub result: O,
}

/// Evaluate `derive` once per value, each time on a fresh clone of `base`
/// with `apply` setting the swept field.
pub fn sweep<I, V, O>(
    base: &I,
    values: &[V],
    apply: impl Fn(&mut I, &V),
    derive: impl Fn(&I) -> O,
) -> Vec<ScenarioPoint<V, O>>
where
    I: Clone,
    V: Clone,
{
    values
        .iter()
        .map(|value| {
            let mut scenario = base.clone();
            apply(&mut scenario, value);
            ScenarioPoint {
                value: value.clone(),
                result: derive(&scenario),
            }
        })
        .collect()
}

/// Largest number of points a [`SweepRange`] expands to.
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// Inclusive range of sweep values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRange {
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

impl SweepRange {
    /// Expand to `min, min + step, ...`, always ending on `max`.
    pub fn values(&self, field: &str) -> PropertyMetricsResult<Vec<Decimal>> {
        if self.step <= Decimal::ZERO {
            return Err(PropertyMetricsError::InvalidInput {
                field: field.into(),
                reason: "Step must be positive".into(),
            });
        }
        if self.min > self.max {
            return Err(PropertyMetricsError::InvalidInput {
                field: field.into(),
                reason: "Min must be <= max".into(),
            });
        }

        let steps = self
            .max
            .checked_sub(self.min)
            .and_then(|span| span.checked_div(self.step));
        let too_many = steps.map_or(true, |n| n >= Decimal::from(MAX_SWEEP_POINTS));
        if too_many {
            return Err(PropertyMetricsError::InvalidInput {
                field: field.into(),
                reason: format!("Range expands to more than {MAX_SWEEP_POINTS} points"),
            });
        }

        let mut values = Vec::new();
        let mut current = self.min;
        while current <= self.max {
            values.push(current);
            current += self.step;
        }
        if let Some(&last) = values.last() {
            if last < self.max {
                values.push(self.max);
            }
        }
        Ok(values)
    }
}
