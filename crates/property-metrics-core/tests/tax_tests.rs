use pretty_assertions::assert_eq;
use property_metrics_core::tax::fhl::{derive_fhl_tax, FhlTaxInput};
use property_metrics_core::tax::stamp_duty::{derive_stamp_duty, StampDutyInput};
use property_metrics_core::RateTables;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn holiday_let() -> FhlTaxInput {
    FhlTaxInput {
        gross_income: dec!(30_000),
        mortgage_interest: dec!(8_000),
        cleaning: dec!(3_000),
        utilities: dec!(1_500),
        insurance: dec!(500),
        management: dec!(3_000),
        maintenance: dec!(1_000),
        tax_bracket: "higher".into(),
        days_available: 210,
        days_let: 105,
        ..Default::default()
    }
}

#[test]
fn test_gate_boundary_qualifies() {
    let tables = RateTables::default();
    let out = derive_fhl_tax(&holiday_let(), &tables).result;
    assert!(out.gate.qualifies);
    assert_eq!(out.gate.explanation.len(), 2);
}

#[test]
fn test_gate_one_day_short() {
    let tables = RateTables::default();
    let mut input = holiday_let();
    input.days_available = 209;
    let out = derive_fhl_tax(&input, &tables);
    assert!(!out.result.gate.qualifies);
    assert!(out.warnings.iter().any(|w| w.contains("FHL")));
}

#[test]
fn test_fhl_beats_section24_for_higher_rate() {
    let tables = RateTables::default();
    let out = derive_fhl_tax(&holiday_let(), &tables).result;
    assert!(out.fhl.total_tax < out.section24.total_tax);
    assert_eq!(out.fhl_advantage, dec!(1_574.2));
}

#[test]
fn test_no_interest_means_same_income_tax() {
    let tables = RateTables::default();
    let mut input = holiday_let();
    input.mortgage_interest = Decimal::ZERO;
    let out = derive_fhl_tax(&input, &tables).result;
    assert_eq!(out.fhl.income_tax, out.section24.income_tax);
    // only the class 4 levy separates them
    assert_eq!(out.fhl_advantage, -out.fhl.class4_levy);
}

#[test]
fn test_sdlt_band_coverage() {
    let tables = RateTables::default();
    for price in [dec!(0), dec!(125_000), dec!(925_001), dec!(3_000_000)] {
        let out = derive_stamp_duty(
            &StampDutyInput {
                price,
                ..Default::default()
            },
            &tables,
        )
        .result;
        let taxed: Decimal = out.bands.iter().map(|b| b.taxable).sum();
        let charged: Decimal = out.bands.iter().map(|b| b.charge).sum();
        assert_eq!(taxed, price);
        assert_eq!(charged, out.total);
    }
}
