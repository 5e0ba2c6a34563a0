use pretty_assertions::assert_eq;
use property_metrics_core::lettings::btl::{derive_btl, BtlInput};
use property_metrics_core::lettings::hmo::{derive_hmo, HmoInput, HmoViability};
use property_metrics_core::lettings::RateSource;
use property_metrics_core::RateTables;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Buy-to-let
// ===========================================================================

fn reference_btl() -> BtlInput {
    BtlInput {
        purchase_price: dec!(250_000),
        monthly_rent: dec!(1_200),
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
fn test_btl_reference_scenario() {
    let tables = RateTables::default();
    let out = derive_btl(&reference_btl(), &tables);
    let m = &out.result;

    assert_eq!(m.gross_yield, dec!(0.0576));
    assert_eq!(m.financing.deposit, dec!(62_500));
    assert_eq!(m.financing.mortgage_amount, dec!(187_500));
    assert_eq!(m.financing.annual_mortgage_interest, dec!(10_312.5));
    assert_eq!(m.financing.interest_rate_source, RateSource::Input);
    assert_eq!(out.metadata.tables_version, "2025-26");
}

#[test]
fn test_btl_from_string_json() {
    let json = r#"{
        "purchase_price": "250000",
        "monthly_rent": "£1,200",
        "deposit_pct": "25",
        "interest_rate": 5.5,
        "management_pct": "10%",
        "maintenance_pct": 5,
        "void_pct": 4,
        "insurance_annual": "300"
    }"#;
    let input: BtlInput = serde_json::from_str(json).unwrap();
    let tables = RateTables::default();
    let out = derive_btl(&input, &tables);
    assert_eq!(out.result.gross_yield, dec!(0.0576));
}

#[test]
fn test_btl_garbage_fields_become_zero() {
    let json = r#"{ "purchase_price": "abc", "monthly_rent": "", "deposit_pct": null }"#;
    let input: BtlInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.purchase_price, Decimal::ZERO);
    assert_eq!(input.monthly_rent, Decimal::ZERO);
    let tables = RateTables::default();
    assert_eq!(derive_btl(&input, &tables).result.gross_yield, Decimal::ZERO);
}

#[test]
fn test_btl_output_is_idempotent() {
    let tables = RateTables::default();
    let a = serde_json::to_string(&derive_btl(&reference_btl(), &tables)).unwrap();
    let b = serde_json::to_string(&derive_btl(&reference_btl(), &tables)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_btl_assumptions_echo_whole_percent() {
    let tables = RateTables::default();
    let out = derive_btl(&reference_btl(), &tables);
    let deposit = out.assumptions.get("deposit_pct").unwrap();
    let as_text = deposit.as_str().map(str::to_string).unwrap_or(deposit.to_string());
    assert!(as_text.starts_with("25"));
}

// ===========================================================================
// HMO
// ===========================================================================

fn sample_hmo() -> HmoInput {
    HmoInput {
        purchase_price: dec!(300_000),
        room_count: 5,
        rent_per_room: dec!(650),
        deposit_pct: dec!(0.25),
        interest_rate: Some(dec!(0.06)),
        management_pct: dec!(0.12),
        maintenance_pct: dec!(0.05),
        void_pct: dec!(0.05),
        insurance_annual: dec!(900),
        bills_monthly: dec!(450),
        licence_fee: dec!(1_500),
        other_costs_annual: dec!(600),
        ..Default::default()
    }
}

#[test]
fn test_hmo_strong_viability() {
    let tables = RateTables::default();
    let out = derive_hmo(&sample_hmo(), &tables).result;
    // NOI 23220 / 300000 = 7.74% -> viable, not strong
    assert_eq!(out.net_yield, dec!(0.0774));
    assert_eq!(out.viability, HmoViability::Viable);
}

#[test]
fn test_hmo_more_rooms_more_cashflow() {
    let tables = RateTables::default();
    let five = derive_hmo(&sample_hmo(), &tables).result;
    let mut input = sample_hmo();
    input.room_count = 6;
    let six = derive_hmo(&input, &tables).result;
    assert!(six.financing.annual_cashflow > five.financing.annual_cashflow);
}

#[test]
fn test_hmo_rate_from_tables() {
    let tables = RateTables::default();
    let mut input = sample_hmo();
    input.interest_rate = None;
    let out = derive_hmo(&input, &tables).result;
    assert_eq!(out.financing.interest_rate, dec!(0.0479));
    assert_eq!(out.financing.interest_rate_source, RateSource::LtvBand);
}
