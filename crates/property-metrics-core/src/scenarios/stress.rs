use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{sweep, ScenarioPoint};
use crate::finance::bridging::{derive_bridging, BridgingInput, CheaperOption};
use crate::format;
use crate::lettings::btl::{derive_btl, BtlInput};
use crate::short_let::serviced::{at_occupancy, MonthlyBreakdown, ServicedInput};
use crate::tables::RateTableProvider;
use crate::tax::fhl::{derive_fhl_tax, FhlTaxInput};
use crate::types::{with_metadata, ComputationOutput, Money, Months, Multiple, Rate};

// ---------------------------------------------------------------------------
// Point types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateStressPoint {
    pub annual_mortgage_interest: Money,
    pub annual_cashflow: Money,
    pub monthly_cashflow: Money,
    pub dscr: Multiple,
    pub cash_on_cash: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcrStressPoint {
    pub icr: Multiple,
    pub passes_basic_rate: bool,
    pub passes_higher_rate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitPoint {
    pub retained_interest: Money,
    pub rolled_interest: Money,
    pub retained_total_cost: Money,
    pub rolled_total_cost: Money,
    pub cheaper: CheaperOption,
    pub saving: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketPoint {
    pub marginal_rate: Rate,
    pub fhl_tax: Money,
    pub section24_tax: Money,
    pub fhl_after_tax_cashflow: Money,
    pub section24_after_tax_cashflow: Money,
    pub fhl_advantage: Money,
}

pub type Sweep<V, O> = ComputationOutput<Vec<ScenarioPoint<V, O>>>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// BTL cashflow and coverage at each contract interest rate.
pub fn btl_rate_stress(
    input: &BtlInput,
    tables: &dyn RateTableProvider,
    rates: &[Rate],
) -> Sweep<Rate, RateStressPoint> {
    trace!("btl_rate_stress: {} rates", rates.len());
    let points = sweep(
        input,
        rates,
        |i, r| i.interest_rate = Some(*r),
        |i| {
            let f = derive_btl(i, tables).result.financing;
            RateStressPoint {
                annual_mortgage_interest: f.annual_mortgage_interest,
                annual_cashflow: f.annual_cashflow,
                monthly_cashflow: f.monthly_cashflow,
                dscr: f.dscr,
                cash_on_cash: f.cash_on_cash,
            }
        },
    );

    let mut warnings = Vec::new();
    if let Some(p) = points.iter().find(|p| p.result.annual_cashflow < Decimal::ZERO) {
        warnings.push(format!(
            "Cashflow turns negative at {}",
            format::percent(p.value)
        ));
    }

    with_metadata(
        "BTL Interest Rate Stress",
        input,
        warnings,
        tables.version(),
        points,
    )
}

/// Lender ICR test at each stress rate.
pub fn btl_icr_stress(
    input: &BtlInput,
    tables: &dyn RateTableProvider,
    stress_rates: &[Rate],
) -> Sweep<Rate, IcrStressPoint> {
    trace!("btl_icr_stress: {} rates", stress_rates.len());
    let points = sweep(
        input,
        stress_rates,
        |i, r| i.stress_rate = Some(*r),
        |i| {
            let f = derive_btl(i, tables).result.financing;
            IcrStressPoint {
                icr: f.icr,
                passes_basic_rate: f.icr_passes_basic_rate,
                passes_higher_rate: f.icr_passes_higher_rate,
            }
        },
    );

    let mut warnings = Vec::new();
    if let Some(p) = points.iter().find(|p| !p.result.passes_basic_rate) {
        warnings.push(format!(
            "ICR fails the basic-rate test from a {} stress rate",
            format::percent(p.value)
        ));
    }

    with_metadata(
        "BTL ICR Stress (lender affordability)",
        input,
        warnings,
        tables.version(),
        points,
    )
}

/// Serviced-accommodation month at each occupancy level.
pub fn occupancy_sweep(
    input: &ServicedInput,
    tables: &dyn RateTableProvider,
    occupancies: &[Rate],
) -> Sweep<Rate, MonthlyBreakdown> {
    trace!("occupancy_sweep: {} levels", occupancies.len());
    let points = sweep(
        input,
        occupancies,
        |i, o| i.base_occupancy_pct = *o,
        |i| at_occupancy(i, i.base_occupancy_pct),
    );

    with_metadata(
        "Serviced Accommodation Occupancy Sweep",
        input,
        Vec::new(),
        tables.version(),
        points,
    )
}

/// Retained versus rolled interest at each exit month.
pub fn bridging_exit_sweep(
    input: &BridgingInput,
    tables: &dyn RateTableProvider,
    exit_months: &[Months],
) -> Sweep<Months, ExitPoint> {
    trace!("bridging_exit_sweep: {} months", exit_months.len());
    let points = sweep(
        input,
        exit_months,
        |i, m| i.exit_month = Some(*m),
        |i| {
            let b = derive_bridging(i, tables).result;
            ExitPoint {
                retained_interest: b.retained.total_interest,
                rolled_interest: b.rolled.interest_at_exit,
                retained_total_cost: b.retained.total_cost,
                rolled_total_cost: b.rolled.total_cost_at_exit,
                cheaper: b.cheaper_at_exit,
                saving: b.saving_at_exit,
            }
        },
    );

    let mut warnings = Vec::new();
    if let Some(p) = points.iter().find(|p| p.value > input.term_months) {
        warnings.push(format!(
            "Exit month {} is beyond the {}-month term",
            p.value, input.term_months
        ));
    }

    with_metadata(
        "Bridging Exit Month Sweep",
        input,
        warnings,
        tables.version(),
        points,
    )
}

/// FHL against Section 24 for each tax bracket key.
pub fn fhl_bracket_comparison(
    input: &FhlTaxInput,
    tables: &dyn RateTableProvider,
    brackets: &[String],
) -> Sweep<String, BracketPoint> {
    trace!("fhl_bracket_comparison: {brackets:?}");
    let points = sweep(
        input,
        brackets,
        |i, b| i.tax_bracket = b.clone(),
        |i| {
            let t = derive_fhl_tax(i, tables).result;
            BracketPoint {
                marginal_rate: t.marginal_rate,
                fhl_tax: t.fhl.total_tax,
                section24_tax: t.section24.total_tax,
                fhl_after_tax_cashflow: t.fhl.after_tax_cashflow,
                section24_after_tax_cashflow: t.section24.after_tax_cashflow,
                fhl_advantage: t.fhl_advantage,
            }
        },
    );

    with_metadata(
        "FHL vs Section 24 by Tax Bracket",
        input,
        Vec::new(),
        tables.version(),
        points,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RateTables;
    use rust_decimal_macros::dec;

    fn btl() -> BtlInput {
        BtlInput {
            purchase_price: dec!(250000),
            monthly_rent: dec!(1200),
            deposit_pct: dec!(0.25),
            interest_rate: Some(dec!(0.055)),
            management_pct: dec!(0.10),
            maintenance_pct: dec!(0.05),
            void_pct: dec!(0.04),
            insurance_annual: dec!(300),
            ..Default::default()
        }
    }

    #[test]
    fn test_rate_stress_is_monotonic() {
        let tables = RateTables::default();
        let rates = [dec!(0.04), dec!(0.05), dec!(0.06), dec!(0.07)];
        let out = btl_rate_stress(&btl(), &tables, &rates);
        let flows: Vec<Money> = out.result.iter().map(|p| p.result.annual_cashflow).collect();
        assert!(flows.windows(2).all(|w| w[0] > w[1]));
        // 187500 * 6% = 11250 > NOI of 11364 - small margin; 7% goes negative
        assert!(out.warnings.iter().any(|w| w.contains("7.00%")));
    }

    #[test]
    fn test_rate_stress_leaves_base_untouched() {
        let tables = RateTables::default();
        let base = btl();
        let _ = btl_rate_stress(&base, &tables, &[dec!(0.09)]);
        assert_eq!(base.interest_rate, Some(dec!(0.055)));
    }

    #[test]
    fn test_icr_stress_pass_flags() {
        let tables = RateTables::default();
        let out = btl_icr_stress(&btl(), &tables, &[dec!(0.05), dec!(0.08)]);
        // 14400 / (187500 * 5%) = 1.536
        assert!(out.result[0].result.passes_higher_rate);
        // 14400 / 15000 = 0.96
        assert!(!out.result[1].result.passes_basic_rate);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_exit_sweep_flips_preference() {
        let tables = RateTables::default();
        let input = BridgingInput {
            principal: dec!(500000),
            property_value: dec!(750000),
            monthly_rate: Some(dec!(0.0085)),
            term_months: 12,
            ..Default::default()
        };
        let out = bridging_exit_sweep(&input, &tables, &[3, 6, 12]);
        assert_eq!(out.result[0].result.cheaper, CheaperOption::Rolled);
        assert_eq!(out.result[2].result.cheaper, CheaperOption::Retained);
        // retained cost identical at every exit
        assert!(out
            .result
            .iter()
            .all(|p| p.result.retained_interest == dec!(51000)));
    }

    #[test]
    fn test_occupancy_sweep() {
        let tables = RateTables::default();
        let input = ServicedInput {
            adr: dec!(100),
            average_stay_nights: dec!(1),
            ..Default::default()
        };
        let out = occupancy_sweep(&input, &tables, &[dec!(0.5), dec!(1)]);
        assert_eq!(out.result[0].result.monthly_cashflow, dec!(1500));
        assert_eq!(out.result[1].result.monthly_cashflow, dec!(3000));
    }

    #[test]
    fn test_bracket_comparison() {
        let tables = RateTables::default();
        let input = FhlTaxInput {
            gross_income: dec!(30000),
            mortgage_interest: dec!(8000),
            cleaning: dec!(9000),
            ..Default::default()
        };
        let brackets = vec!["basic".to_string(), "higher".into(), "additional".into()];
        let out = fhl_bracket_comparison(&input, &tables, &brackets);
        let adv: Vec<Money> = out.result.iter().map(|p| p.result.fhl_advantage).collect();
        // Section 24 bites harder as the marginal rate rises
        assert!(adv.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(out.result[1].value, "higher");
    }
}
