//! Static, versioned benchmark tables injected into the derivers.
//!
//! Derivers never reach for globals: they receive a [`RateTableProvider`].
//! [`RateTables`] is the serde-backed implementation, with compiled-in
//! defaults and JSON/YAML loading for overrides.

mod defaults;

use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::PropertyMetricsError;
use crate::schedule::Schedule;
use crate::types::{Money, Multiple, Rate};
use crate::PropertyMetricsResult;

pub use defaults::DEFAULT_TABLES_VERSION;

/// Fallback key for authorities, zones, regions and loft conversion kinds.
pub const FALLBACK_KEY: &str = "other";

/// Fallback key for marginal tax brackets.
pub const FALLBACK_BRACKET: &str = "basic";

// ---------------------------------------------------------------------------
// Table row types
// ---------------------------------------------------------------------------

/// Lender interest-cover parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcrParameters {
    /// Notional rate applied to the loan for the ICR test (e.g. 0.055)
    pub stress_rate: Rate,
    /// Minimum ICR for basic-rate taxpayers (e.g. 1.25)
    pub basic_rate_threshold: Multiple,
    /// Minimum ICR for higher/additional-rate taxpayers (e.g. 1.45)
    pub higher_rate_threshold: Multiple,
}

/// How a CIL liability of a given size is paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalmentPolicy {
    pub label: String,
    /// Days after commencement each equal instalment falls due
    pub offsets_days: Vec<u32>,
}

impl InstalmentPolicy {
    pub fn instalment_count(&self) -> usize {
        self.offsets_days.len()
    }
}

/// Build cost and value uplift for a loft conversion kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoftConversionCost {
    /// National-average build cost per sqm of converted floor
    pub cost_per_sqm: Money,
    /// Typical uplift on pre-conversion value
    pub value_uplift: Rate,
}

/// Fixed parameters of the rental income tax comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTaxParameters {
    pub fhl_min_days_available: u32,
    pub fhl_min_days_let: u32,
    /// Profit threshold above which the secondary (Class 4 style) levy applies
    pub class4_threshold: Money,
    pub class4_rate: Rate,
    /// Basic-rate credit on finance costs for non-FHL lets
    pub finance_cost_credit_rate: Rate,
}

/// Residential stamp duty land tax schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampDutyTables {
    pub standard: Schedule<Rate>,
    pub first_time_buyer: Schedule<Rate>,
    /// Relief is lost entirely above this price
    pub first_time_buyer_max_price: Money,
    pub additional_dwelling_surcharge: Rate,
    pub non_resident_surcharge: Rate,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Read-only source of every rate, index and threshold the derivers use.
///
/// Lookups by key never fail: unknown keys resolve to the table's fallback
/// entry.
pub trait RateTableProvider: Send + Sync {
    fn version(&self) -> &str;

    /// LTV (fraction) to annual buy-to-let mortgage rate
    fn btl_rate_bands(&self) -> &Schedule<Rate>;

    /// LTV (fraction) to monthly bridging rate
    fn bridging_rate_bands(&self) -> &Schedule<Rate>;

    fn icr(&self) -> &IcrParameters;

    /// Base CIL rate per sqm at adoption for an authority and charging zone
    fn cil_base_rate(&self, authority: &str, zone: &str) -> Money;

    /// CIL (BCIS all-in tender price) index for a calendar year
    fn cil_index(&self, year: i32) -> Decimal;

    /// Most recent year with a published index
    fn latest_cil_index_year(&self) -> i32;

    fn cil_instalment_policy(&self) -> &Schedule<InstalmentPolicy>;

    /// Regional build cost multiplier (1.0 = national average)
    fn regional_multiplier(&self, region: &str) -> Decimal;

    fn loft_conversion(&self, kind: &str) -> LoftConversionCost;

    /// Flat marginal income tax rate for a bracket key
    fn marginal_tax_rate(&self, bracket: &str) -> Rate;

    fn income_tax_schedule(&self) -> &Schedule<Rate>;

    fn property_tax(&self) -> &PropertyTaxParameters;

    fn stamp_duty(&self) -> &StampDutyTables;
}

// ---------------------------------------------------------------------------
// Serde-backed implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTables {
    pub version: String,
    pub btl_rate_bands: Schedule<Rate>,
    pub bridging_rate_bands: Schedule<Rate>,
    pub icr: IcrParameters,
    /// authority -> zone -> base rate per sqm
    pub cil_rates: BTreeMap<String, BTreeMap<String, Money>>,
    /// year -> index value
    pub cil_indices: BTreeMap<i32, Decimal>,
    pub cil_instalments: Schedule<InstalmentPolicy>,
    pub regional_multipliers: BTreeMap<String, Decimal>,
    pub loft_conversions: BTreeMap<String, LoftConversionCost>,
    pub tax_brackets: BTreeMap<String, Rate>,
    pub income_tax_bands: Schedule<Rate>,
    pub property_tax: PropertyTaxParameters,
    pub stamp_duty: StampDutyTables,
}

impl RateTables {
    /// Load and validate a table set from JSON.
    pub fn from_json(json: &str) -> PropertyMetricsResult<Self> {
        let tables: RateTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Check that every keyed table carries its fallback entry.
    ///
    /// Band ordering is already enforced when each schedule deserializes.
    pub fn validate(&self) -> PropertyMetricsResult<()> {
        let Some(fallback_authority) = self.cil_rates.get(FALLBACK_KEY) else {
            return Err(missing_fallback("cil_rates", FALLBACK_KEY));
        };
        if fallback_authority.is_empty() {
            return Err(missing_fallback("cil_rates.other", FALLBACK_KEY));
        }
        for (authority, zones) in &self.cil_rates {
            if !zones.contains_key(FALLBACK_KEY) {
                return Err(missing_fallback(&format!("cil_rates.{authority}"), FALLBACK_KEY));
            }
        }
        if self.cil_indices.is_empty() {
            return Err(PropertyMetricsError::InvalidTable {
                table: "cil_indices".into(),
                reason: "at least one index year is required".into(),
            });
        }
        if let Some((year, _)) = self.cil_indices.iter().find(|(_, v)| **v <= Decimal::ZERO) {
            return Err(PropertyMetricsError::InvalidTable {
                table: "cil_indices".into(),
                reason: format!("index for {year} must be positive"),
            });
        }
        if !self.regional_multipliers.contains_key(FALLBACK_KEY) {
            return Err(missing_fallback("regional_multipliers", FALLBACK_KEY));
        }
        if !self.loft_conversions.contains_key(FALLBACK_KEY) {
            return Err(missing_fallback("loft_conversions", FALLBACK_KEY));
        }
        if !self.tax_brackets.contains_key(FALLBACK_BRACKET) {
            return Err(missing_fallback("tax_brackets", FALLBACK_BRACKET));
        }
        if self
            .cil_instalments
            .bands()
            .iter()
            .any(|b| b.value.offsets_days.is_empty())
        {
            return Err(PropertyMetricsError::InvalidTable {
                table: "cil_instalments".into(),
                reason: "every policy needs at least one instalment".into(),
            });
        }
        Ok(())
    }
}

fn missing_fallback(table: &str, key: &str) -> PropertyMetricsError {
    PropertyMetricsError::InvalidTable {
        table: table.to_string(),
        reason: format!("missing fallback entry '{key}'"),
    }
}

/// Canonical form of a lookup key: trimmed, lowercase, `_` for spaces and hyphens.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

fn lookup_or_fallback<'a, V>(
    table: &'a BTreeMap<String, V>,
    table_name: &str,
    key: &str,
    fallback: &str,
) -> Option<&'a V> {
    let normalized = normalize_key(key);
    table.get(&normalized).or_else(|| {
        debug!("{table_name}: no entry for '{key}', using '{fallback}'");
        table.get(fallback)
    })
}

impl RateTableProvider for RateTables {
    fn version(&self) -> &str {
        &self.version
    }

    fn btl_rate_bands(&self) -> &Schedule<Rate> {
        &self.btl_rate_bands
    }

    fn bridging_rate_bands(&self) -> &Schedule<Rate> {
        &self.bridging_rate_bands
    }

    fn icr(&self) -> &IcrParameters {
        &self.icr
    }

    fn cil_base_rate(&self, authority: &str, zone: &str) -> Money {
        lookup_or_fallback(&self.cil_rates, "cil_rates", authority, FALLBACK_KEY)
            .and_then(|zones| lookup_or_fallback(zones, "cil_zones", zone, FALLBACK_KEY))
            .copied()
            .unwrap_or_else(|| {
                warn!("cil_rates has no fallback entry; charging zero");
                Decimal::ZERO
            })
    }

    fn cil_index(&self, year: i32) -> Decimal {
        if let Some(v) = self.cil_indices.get(&year) {
            return *v;
        }
        let nearest = self
            .cil_indices
            .range(..=year)
            .next_back()
            .or_else(|| self.cil_indices.iter().next());
        match nearest {
            Some((found, v)) => {
                debug!("cil_indices: no index for {year}, using {found}");
                *v
            }
            None => Decimal::ZERO,
        }
    }

    fn latest_cil_index_year(&self) -> i32 {
        self.cil_indices
            .keys()
            .next_back()
            .copied()
            .unwrap_or_default()
    }

    fn cil_instalment_policy(&self) -> &Schedule<InstalmentPolicy> {
        &self.cil_instalments
    }

    fn regional_multiplier(&self, region: &str) -> Decimal {
        lookup_or_fallback(
            &self.regional_multipliers,
            "regional_multipliers",
            region,
            FALLBACK_KEY,
        )
        .copied()
        .unwrap_or(Decimal::ONE)
    }

    fn loft_conversion(&self, kind: &str) -> LoftConversionCost {
        lookup_or_fallback(&self.loft_conversions, "loft_conversions", kind, FALLBACK_KEY)
            .cloned()
            .unwrap_or(LoftConversionCost {
                cost_per_sqm: Decimal::ZERO,
                value_uplift: Decimal::ZERO,
            })
    }

    fn marginal_tax_rate(&self, bracket: &str) -> Rate {
        lookup_or_fallback(&self.tax_brackets, "tax_brackets", bracket, FALLBACK_BRACKET)
            .copied()
            .unwrap_or_default()
    }

    fn income_tax_schedule(&self) -> &Schedule<Rate> {
        &self.income_tax_bands
    }

    fn property_tax(&self) -> &PropertyTaxParameters {
        &self.property_tax
    }

    fn stamp_duty(&self) -> &StampDutyTables {
        &self.stamp_duty
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
