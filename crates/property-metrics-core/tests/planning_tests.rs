use pretty_assertions::assert_eq;
use property_metrics_core::planning::cil::{derive_cil, CilInput};
use property_metrics_core::planning::development::{derive_development_appraisal, DevelopmentInput};
use property_metrics_core::planning::loft::{derive_loft_conversion, LoftConversionInput};
use property_metrics_core::RateTables;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// CIL
// ===========================================================================

#[test]
fn test_cil_45k_two_instalments() {
    let tables = RateTables::default();
    let input = CilInput {
        authority: "other".into(),
        zone: "other".into(),
        gross_area_sqm: dec!(450),
        base_rate_override: Some(dec!(100)),
        ..Default::default()
    };
    let out = derive_cil(&input, &tables).result;
    assert_eq!(out.liability, dec!(45_000));
    let amounts: Vec<Decimal> = out.instalments.iter().map(|i| i.amount).collect();
    assert_eq!(amounts, vec![dec!(22_500), dec!(22_500)]);
}

#[test]
fn test_cil_small_liability_single_payment() {
    let tables = RateTables::default();
    let input = CilInput {
        gross_area_sqm: dec!(50),
        base_rate_override: Some(dec!(100)),
        ..Default::default()
    };
    let out = derive_cil(&input, &tables).result;
    assert_eq!(out.liability, dec!(5_000));
    assert_eq!(out.instalments.len(), 1);
    assert_eq!(out.instalments[0].due_in_days, 0);
}

#[test]
fn test_cil_large_liability_four_payments_sum_exactly() {
    let tables = RateTables::default();
    let input = CilInput {
        gross_area_sqm: dec!(3_333.33),
        base_rate_override: Some(dec!(333.33)),
        ..Default::default()
    };
    let out = derive_cil(&input, &tables).result;
    assert_eq!(out.instalments.len(), 4);
    let total: Decimal = out.instalments.iter().map(|i| i.amount).sum();
    assert_eq!(total, out.liability);
    assert_eq!(out.liability, out.liability.round_dp(2));
}

#[test]
fn test_cil_from_json_with_date() {
    let json = r#"{
        "authority": "Southwark", "zone": "zone_b",
        "gross_area_sqm": "1,200", "adoption_year": "2015",
        "charging_year": 2024, "commencement_date": "2025-04-01"
    }"#;
    let input: CilInput = serde_json::from_str(json).unwrap();
    let tables = RateTables::default();
    let out = derive_cil(&input, &tables).result;
    assert_eq!(out.base_rate, dec!(200));
    assert!(out.instalments.iter().all(|i| i.due_date.is_some()));
}

// ===========================================================================
// Loft and development
// ===========================================================================

#[test]
fn test_loft_mansard_in_london() {
    let tables = RateTables::default();
    let input = LoftConversionInput {
        property_value: dec!(800_000),
        floor_area_sqm: dec!(40),
        conversion_type: "mansard".into(),
        region: "london".into(),
        professional_fees_pct: dec!(0.12),
    };
    let out = derive_loft_conversion(&input, &tables).result;
    // 2100 * 1.2 = 2520/sqm
    assert_eq!(out.build_cost, dec!(100_800));
    assert_eq!(out.value_added, dec!(160_000));
    assert!(out.roi > Decimal::ZERO);
}

#[test]
fn test_development_residual_value_positive() {
    let tables = RateTables::default();
    let input = DevelopmentInput {
        gdv: dec!(3_000_000),
        land_price: dec!(500_000),
        gross_internal_area_sqm: dec!(800),
        build_cost_per_sqm: dec!(1_500),
        target_profit_pct: dec!(0.20),
        ..Default::default()
    };
    let out = derive_development_appraisal(&input, &tables).result;
    // 3m - 500k - 1.2m = 1.3m profit
    assert_eq!(out.profit, dec!(1_300_000));
    assert!(out.viable);
    // 3m - 600k target - 1.2m build
    assert_eq!(out.residual_land_value, dec!(1_200_000));
}
