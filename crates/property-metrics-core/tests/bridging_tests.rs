use pretty_assertions::assert_eq;
use property_metrics_core::finance::bridging::{
    derive_bridging, find_crossover, BridgingInput, CheaperOption,
};
use property_metrics_core::RateTables;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_loan() -> BridgingInput {
    BridgingInput {
        principal: dec!(500_000),
        property_value: dec!(750_000),
        monthly_rate: Some(dec!(0.0085)),
        term_months: 12,
        exit_month: None,
        arrangement_fee_pct: dec!(0.02),
        exit_fee_pct: dec!(0.01),
    }
}

#[test]
fn test_retained_fixed_across_exits() {
    let tables = RateTables::default();
    let costs: Vec<Decimal> = [1, 4, 8, 12]
        .iter()
        .map(|m| {
            let mut input = sample_loan();
            input.exit_month = Some(*m);
            derive_bridging(&input, &tables).result.retained.total_interest
        })
        .collect();
    assert!(costs.iter().all(|c| *c == dec!(51_000)));
}

#[test]
fn test_crossover_is_unique_boundary() {
    let tables = RateTables::default();
    let out = derive_bridging(&sample_loan(), &tables).result;
    let retained = out.retained.total_interest;
    let crossover = out.crossover_month.unwrap();

    for m in &out.rolled.schedule {
        if m.month < crossover {
            assert!(m.cumulative_interest <= retained);
        } else {
            assert!(m.cumulative_interest > retained);
        }
    }
}

#[test]
fn test_zero_rate_never_crosses() {
    let tables = RateTables::default();
    let mut input = sample_loan();
    input.monthly_rate = Some(Decimal::ZERO);
    let out = derive_bridging(&input, &tables).result;
    assert_eq!(out.crossover_month, None);
    assert_eq!(out.cheaper_at_exit, CheaperOption::Equal);
    assert_eq!(find_crossover(&out.rolled.schedule, Decimal::ZERO), None);
}

#[test]
fn test_whole_percent_monthly_rate_from_json() {
    let json = r#"{ "principal": "£500,000", "property_value": 750000,
                    "monthly_rate": "0.85", "term_months": "12" }"#;
    let input: BridgingInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.monthly_rate, Some(dec!(0.0085)));
    assert_eq!(input.term_months, 12);
}

#[test]
fn test_redemption_includes_exit_fee() {
    let tables = RateTables::default();
    let out = derive_bridging(&sample_loan(), &tables).result;
    assert_eq!(out.exit_fee, dec!(5_000));
    assert_eq!(
        out.rolled.redemption_amount,
        out.rolled.balance_at_exit + dec!(5_000)
    );
}
