use property_metrics_core::finance::bridging::{derive_bridging, BridgingInput};
use property_metrics_core::lettings::btl::{derive_btl, BtlInput};
use property_metrics_core::lettings::hmo::{derive_hmo, HmoInput};
use property_metrics_core::tables::RateTableProvider;
use property_metrics_core::tax::fhl::fhl_gate;
use property_metrics_core::RateTables;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn money(max: i64) -> impl Strategy<Value = Decimal> {
    (0..max).prop_map(Decimal::from)
}

fn pct(max_basis_points: i64) -> impl Strategy<Value = Decimal> {
    (0..max_basis_points).prop_map(|bp| Decimal::new(bp, 4))
}

fn btl_input() -> impl Strategy<Value = BtlInput> {
    (money(2_000_000), money(10_000), pct(10_000), pct(1_500), pct(2_000))
        .prop_map(|(price, rent, deposit, rate, mgmt)| BtlInput {
            purchase_price: price,
            monthly_rent: rent,
            deposit_pct: deposit,
            interest_rate: Some(rate),
            management_pct: mgmt,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn btl_is_idempotent(input in btl_input()) {
        let tables = RateTables::default();
        let a = serde_json::to_string(&derive_btl(&input, &tables)).unwrap();
        let b = serde_json::to_string(&derive_btl(&input, &tables)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn btl_returns_monotonic_in_rent(
        price in 1i64..2_000_000,
        rent in 0i64..10_000,
        deposit_bp in 1i64..10_000,
        rate in pct(1_500),
        mgmt in pct(2_000),
        extra in 1i64..5_000,
    ) {
        let tables = RateTables::default();
        let input = BtlInput {
            purchase_price: Decimal::from(price),
            monthly_rent: Decimal::from(rent),
            deposit_pct: Decimal::new(deposit_bp, 4),
            interest_rate: Some(rate),
            management_pct: mgmt,
            ..Default::default()
        };
        let base = derive_btl(&input, &tables).result;
        let mut richer = input.clone();
        richer.monthly_rent += Decimal::from(extra);
        let more = derive_btl(&richer, &tables).result;
        // management cost is a share of rent below 100%, so every return rises
        prop_assert!(more.financing.annual_cashflow > base.financing.annual_cashflow);
        prop_assert!(more.gross_yield > base.gross_yield);
        prop_assert!(more.net_yield > base.net_yield);
        prop_assert!(more.financing.cash_on_cash > base.financing.cash_on_cash);
    }

    #[test]
    fn hmo_returns_monotonic_in_room_rent(
        rooms in 1u32..12,
        rent in 200i64..1_500,
        extra in 1i64..300,
        deposit_bp in 1i64..10_000,
    ) {
        let tables = RateTables::default();
        let input = HmoInput {
            purchase_price: Decimal::from(350_000),
            room_count: rooms,
            rent_per_room: Decimal::from(rent),
            deposit_pct: Decimal::new(deposit_bp, 4),
            interest_rate: Some(Decimal::new(55, 3)),
            management_pct: Decimal::new(12, 2),
            ..Default::default()
        };
        let mut richer = input.clone();
        richer.rent_per_room += Decimal::from(extra);
        let a = derive_hmo(&input, &tables).result;
        let b = derive_hmo(&richer, &tables).result;
        prop_assert!(b.financing.annual_cashflow > a.financing.annual_cashflow);
        prop_assert!(b.gross_yield > a.gross_yield);
        prop_assert!(b.net_yield > a.net_yield);
        prop_assert!(b.financing.cash_on_cash > a.financing.cash_on_cash);
    }

    #[test]
    fn income_tax_slices_cover_income(income in money(1_000_000)) {
        let tables = RateTables::default();
        let slices = tables.income_tax_schedule().slices(income);
        let covered: Decimal = slices.iter().map(|s| s.taxable).sum();
        prop_assert_eq!(covered, income);
    }

    #[test]
    fn stamp_duty_slices_cover_price(price in money(5_000_000)) {
        let tables = RateTables::default();
        let slices = tables.stamp_duty().standard.slices(price);
        let covered: Decimal = slices.iter().map(|s| s.taxable).sum();
        prop_assert_eq!(covered, price);
    }

    #[test]
    fn bridging_crossover_unique(
        principal in 10_000i64..2_000_000,
        rate_bp in 1i64..300,
        term in 2u32..36,
    ) {
        let tables = RateTables::default();
        let input = BridgingInput {
            principal: Decimal::from(principal),
            monthly_rate: Some(Decimal::new(rate_bp, 4)),
            term_months: term,
            ..Default::default()
        };
        let out = derive_bridging(&input, &tables).result;
        let retained = out.retained.total_interest;
        let above: Vec<bool> = out
            .rolled
            .schedule
            .iter()
            .map(|m| m.cumulative_interest > retained)
            .collect();
        // once above, always above: at most one false -> true transition
        let flips = above.windows(2).filter(|w| !w[0] && w[1]).count();
        prop_assert!(flips <= 1);
        prop_assert!(above.windows(2).all(|w| !w[0] || w[1]));
        match out.crossover_month {
            Some(m) => prop_assert!(above[(m - 1) as usize]),
            None => prop_assert!(above.iter().all(|a| !a)),
        }
    }

    #[test]
    fn fhl_gate_thresholds(available in 0u32..366, let_days in 0u32..366) {
        let tables = RateTables::default();
        let gate = fhl_gate(available, let_days, tables.property_tax());
        prop_assert_eq!(gate.qualifies, available >= 210 && let_days >= 105);
    }
}
