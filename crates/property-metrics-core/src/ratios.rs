//! Yield and coverage arithmetic shared by the lettings, bridging and
//! short-let derivers.

use rust_decimal::Decimal;

use crate::types::{Money, Multiple, Rate};

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Annual income as a fraction of the capital it is measured against.
pub fn compute_yield(annual_income: Money, capital: Money) -> Rate {
    safe_div(annual_income, capital)
}

/// Net operating income over annual debt service.
pub fn compute_dscr(net_operating_income: Money, annual_debt_service: Money) -> Multiple {
    safe_div(net_operating_income, annual_debt_service)
}

/// Lender interest cover: gross rent against interest at a stressed rate.
pub fn compute_icr(annual_gross_rent: Money, principal: Money, stress_rate: Rate) -> Multiple {
    safe_div(annual_gross_rent, principal * stress_rate)
}

/// Annual cashflow over the cash put in.
pub fn cash_on_cash(annual_cashflow: Money, equity: Money) -> Rate {
    safe_div(annual_cashflow, equity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_icr_known_answer() {
        // 14400 / (187500 * 0.055) = 14400 / 10312.5
        let icr = compute_icr(dec!(14400), dec!(187500), dec!(0.055));
        assert!((icr - dec!(1.3964)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_zero_deposit_cash_on_cash_is_zero() {
        assert_eq!(cash_on_cash(dec!(5000), Decimal::ZERO), Decimal::ZERO);
    }
}
