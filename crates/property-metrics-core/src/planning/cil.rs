use chrono::{Days, NaiveDate};
use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::to_pence;
use crate::parse::lenient;
use crate::ratios::safe_div;
use crate::tables::{normalize_key, RateTableProvider};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Community Infrastructure Levy inputs. Areas are gross internal sqm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CilInput {
    /// Charging authority key, e.g. "camden"
    #[serde(default)]
    pub authority: String,
    /// Charging zone within the authority, e.g. "zone_a"
    #[serde(default)]
    pub zone: String,
    #[serde(default, with = "lenient::money")]
    pub gross_area_sqm: Money,
    /// Floorspace being demolished or converted
    #[serde(default, with = "lenient::money")]
    pub existing_area_sqm: Money,
    /// Existing floorspace was in lawful use for 6 of the last 36 months
    #[serde(default)]
    pub existing_lawful_use: bool,
    /// Discretionary or social-housing relief on the chargeable area
    #[serde(default, with = "lenient::percent")]
    pub relief_pct: Rate,
    /// Self-build exemption granted
    #[serde(default)]
    pub self_build_exempt: bool,
    /// Year the charging schedule was adopted
    #[serde(
        default,
        with = "lenient::optional_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub adoption_year: Option<i32>,
    /// Year planning permission is granted; defaults to the latest index year
    #[serde(
        default,
        with = "lenient::optional_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub charging_year: Option<i32>,
    /// Base rate per sqm, overriding the authority table
    #[serde(
        default,
        with = "lenient::optional_money",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_rate_override: Option<Money>,
    #[serde(
        default,
        with = "lenient::optional_money",
        skip_serializing_if = "Option::is_none"
    )]
    pub adoption_index_override: Option<Decimal>,
    #[serde(
        default,
        with = "lenient::optional_money",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_index_override: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commencement_date: Option<NaiveDate>,
}

/// One payment of the levy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instalment {
    pub number: u32,
    pub amount: Money,
    pub due_in_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CilMetrics {
    pub authority: String,
    pub zone: String,
    pub base_rate: Money,
    pub adoption_index: Decimal,
    pub current_index: Decimal,
    /// current index / adoption index
    pub indexation_ratio: Decimal,
    /// base rate * indexation ratio
    pub indexed_rate: Money,
    pub gross_area_sqm: Money,
    pub existing_area_deducted: Money,
    pub net_area_sqm: Money,
    pub relief: Rate,
    /// net area * (1 - relief)
    pub chargeable_area_sqm: Money,
    pub exempt: bool,
    /// Liability in pence; instalments sum to exactly this
    pub liability: Money,
    pub instalment_policy: String,
    pub instalments: Vec<Instalment>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Indexed CIL liability and its instalment schedule.
pub fn derive_cil(input: &CilInput, tables: &dyn RateTableProvider) -> ComputationOutput<CilMetrics> {
    trace!("derive_cil: {input:?}");
    let mut warnings: Vec<String> = Vec::new();

    // --- Rate and indexation ---
    let base_rate = input
        .base_rate_override
        .unwrap_or_else(|| tables.cil_base_rate(&input.authority, &input.zone));

    let charging_year = input
        .charging_year
        .unwrap_or_else(|| tables.latest_cil_index_year());
    let current_index = input
        .current_index_override
        .unwrap_or_else(|| tables.cil_index(charging_year));
    let adoption_index = match (input.adoption_index_override, input.adoption_year) {
        (Some(index), _) => index,
        (None, Some(year)) => tables.cil_index(year),
        (None, None) => {
            warnings.push("No adoption year given — rate is not indexed".into());
            current_index
        }
    };
    let indexation_ratio = safe_div(current_index, adoption_index);
    let indexed_rate = base_rate * indexation_ratio;

    // --- Areas ---
    let existing_area_deducted = if input.existing_lawful_use {
        input.existing_area_sqm.min(input.gross_area_sqm).max(Decimal::ZERO)
    } else {
        if input.existing_area_sqm > Decimal::ZERO {
            warnings.push(
                "Existing floorspace not in lawful use — no deduction applied".into(),
            );
        }
        Decimal::ZERO
    };
    let net_area_sqm = (input.gross_area_sqm - existing_area_deducted).max(Decimal::ZERO);
    let chargeable_area_sqm = net_area_sqm * (Decimal::ONE - input.relief_pct);

    // --- Liability ---
    let liability = if input.self_build_exempt {
        Decimal::ZERO
    } else {
        to_pence(chargeable_area_sqm * indexed_rate)
    };

    let band = tables.cil_instalment_policy().band_for(liability);
    let policy = &band.value;
    let instalments = if liability.is_zero() {
        Vec::new()
    } else {
        split_instalments(liability, &policy.offsets_days, input.commencement_date)
    };

    let output = CilMetrics {
        authority: normalize_key(&input.authority),
        zone: normalize_key(&input.zone),
        base_rate,
        adoption_index,
        current_index,
        indexation_ratio,
        indexed_rate,
        gross_area_sqm: input.gross_area_sqm,
        existing_area_deducted,
        net_area_sqm,
        relief: input.relief_pct,
        chargeable_area_sqm,
        exempt: input.self_build_exempt,
        liability,
        instalment_policy: policy.label.clone(),
        instalments,
    };

    with_metadata(
        "Community Infrastructure Levy (indexed, tiered instalments)",
        input,
        warnings,
        tables.version(),
        output,
    )
}

/// Split a pence-rounded liability into equal instalments. The final
/// instalment absorbs the rounding remainder.
pub fn split_instalments(
    liability: Money,
    offsets_days: &[u32],
    commencement: Option<NaiveDate>,
) -> Vec<Instalment> {
    if offsets_days.is_empty() {
        return Vec::new();
    }

    let count = Decimal::from(offsets_days.len() as u64);
    let equal = to_pence(liability / count);
    let last = offsets_days.len() - 1;
    let mut allocated = Decimal::ZERO;

    offsets_days
        .iter()
        .enumerate()
        .map(|(i, offset)| {
            let amount = if i == last {
                liability - allocated
            } else {
                equal
            };
            allocated += amount;
            Instalment {
                number: i as u32 + 1,
                amount,
                due_in_days: *offset,
                due_date: commencement
                    .and_then(|d| d.checked_add_days(Days::new(u64::from(*offset)))),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RateTables;
    use rust_decimal_macros::dec;

    fn sample_input() -> CilInput {
        CilInput {
            authority: "Camden".into(),
            zone: "Zone A".into(),
            gross_area_sqm: dec!(400),
            existing_area_sqm: dec!(100),
            existing_lawful_use: true,
            relief_pct: Decimal::ZERO,
            self_build_exempt: false,
            adoption_year: Some(2015),
            charging_year: Some(2025),
            base_rate_override: None,
            adoption_index_override: None,
            current_index_override: None,
            commencement_date: None,
        }
    }

    #[test]
    fn test_indexed_liability() {
        let tables = RateTables::default();
        let out = derive_cil(&sample_input(), &tables).result;

        assert_eq!(out.base_rate, dec!(500));
        assert_eq!(out.adoption_index, dec!(256));
        assert_eq!(out.current_index, dec!(384));
        assert_eq!(out.indexation_ratio, dec!(1.5));
        assert_eq!(out.indexed_rate, dec!(750));
        assert_eq!(out.net_area_sqm, dec!(300));
        // 300 * 750 = 225000 -> two instalments
        assert_eq!(out.liability, dec!(225000));
        assert_eq!(out.instalments.len(), 2);
    }

    #[test]
    fn test_no_lawful_use_means_no_deduction() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.existing_lawful_use = false;
        let out = derive_cil(&input, &tables);
        assert_eq!(out.result.net_area_sqm, dec!(400));
        assert_eq!(out.result.existing_area_deducted, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_relief_reduces_area_not_rate() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.relief_pct = dec!(0.40);
        let out = derive_cil(&input, &tables).result;
        assert_eq!(out.indexed_rate, dec!(750));
        assert_eq!(out.chargeable_area_sqm, dec!(180));
        assert_eq!(out.liability, dec!(135000));
    }

    #[test]
    fn test_self_build_zeroes_liability() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.self_build_exempt = true;
        let out = derive_cil(&input, &tables).result;
        assert_eq!(out.liability, Decimal::ZERO);
        assert!(out.instalments.is_empty());
        assert!(out.exempt);
    }

    #[test]
    fn test_45k_liability_two_equal_instalments() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.base_rate_override = Some(dec!(150));
        input.adoption_year = None;
        // 300 sqm * 150 = 45000, unindexed
        let out = derive_cil(&input, &tables).result;
        assert_eq!(out.liability, dec!(45000));
        assert_eq!(out.instalments.len(), 2);
        assert_eq!(out.instalments[0].amount, dec!(22500));
        assert_eq!(out.instalments[1].amount, dec!(22500));
        assert_eq!(out.instalments[1].due_in_days, 180);
    }

    #[test]
    fn test_tier_boundaries() {
        let tables = RateTables::default();
        let policy = tables.cil_instalment_policy();
        assert_eq!(policy.lookup(dec!(9999.99)).instalment_count(), 1);
        assert_eq!(policy.lookup(dec!(10000)).instalment_count(), 2);
        assert_eq!(policy.lookup(dec!(500000)).instalment_count(), 2);
        assert_eq!(policy.lookup(dec!(500000.01)).instalment_count(), 4);
    }

    #[test]
    fn test_instalments_absorb_rounding_in_last() {
        let parts = split_instalments(dec!(1000000.01), &[0, 90, 180, 270], None);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].amount, dec!(250000.00));
        assert_eq!(parts[3].amount, dec!(250000.01));
        let total: Decimal = parts.iter().map(|p| p.amount).sum();
        assert_eq!(total, dec!(1000000.01));
    }

    #[test]
    fn test_due_dates_from_commencement() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let parts = split_instalments(dec!(20000), &[0, 180], Some(start));
        assert_eq!(parts[0].due_date, Some(start));
        assert_eq!(parts[1].due_date, NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn test_unknown_authority_falls_back() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.authority = "Gotham".into();
        let out = derive_cil(&input, &tables).result;
        assert_eq!(out.base_rate, dec!(100));
    }
}
