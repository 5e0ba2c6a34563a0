use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::ratios::safe_div;
use crate::types::{Money, Months, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly figure to annual. The only annualization used anywhere.
pub fn annualize(monthly: Money) -> Money {
    monthly * MONTHS_PER_YEAR
}

/// Annual figure to monthly.
pub fn monthly_from_annual(annual: Money) -> Money {
    annual / MONTHS_PER_YEAR
}

/// Interest-only monthly payment: `principal * annual_rate / 12`.
pub fn interest_only_monthly(principal: Money, annual_rate: Rate) -> Money {
    monthly_from_annual(principal * annual_rate)
}

/// Standard fixed-rate repayment: P * r / (1 - (1+r)^-n) with r monthly.
///
/// Zero rate amortises straight-line; zero term returns zero. A compound
/// factor too large to represent is treated as infinite, which leaves the
/// interest-only payment `P * r`.
pub fn repayment_monthly(principal: Money, annual_rate: Rate, term_months: Months) -> Money {
    if term_months == 0 {
        return Decimal::ZERO;
    }

    let monthly_rate = monthly_from_annual(annual_rate);
    if monthly_rate.is_zero() {
        return principal / Decimal::from(term_months);
    }

    let discount = match compound_factor(monthly_rate, term_months) {
        Some(compound) => safe_div(Decimal::ONE, compound),
        None => Decimal::ZERO,
    };
    safe_div(
        principal.saturating_mul(monthly_rate),
        Decimal::ONE - discount,
    )
}

/// (1 + r)^n via iterative multiplication; `None` once the factor overflows.
pub fn compound_factor(rate: Rate, periods: Months) -> Option<Decimal> {
    let step = Decimal::ONE.checked_add(rate)?;
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor.checked_mul(step)?;
    }
    Some(factor)
}

/// One month of a rolled-up (compounding) interest schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolledMonth {
    pub month: Months,
    /// Balance after this month's interest is added
    pub balance: Money,
    /// Interest added in this month
    pub interest: Money,
    /// balance - principal
    pub cumulative_interest: Money,
}

/// Simulate monthly compounding onto the balance for `months` months.
///
/// `balance(m) = balance(m-1) * (1 + monthly_rate)`, month 1 first. The
/// schedule ends early at the first month whose balance cannot be
/// represented, so callers compare its length against `months`.
pub fn amortize_rolled_interest(
    principal: Money,
    monthly_rate: Rate,
    months: Months,
) -> Vec<RolledMonth> {
    let mut schedule = Vec::with_capacity(months as usize);
    let mut balance = principal;

    for month in 1..=months {
        let Some(interest) = balance.checked_mul(monthly_rate) else {
            break;
        };
        let Some(next) = balance.checked_add(interest) else {
            break;
        };
        let Some(cumulative_interest) = next.checked_sub(principal) else {
            break;
        };
        balance = next;
        schedule.push(RolledMonth {
            month,
            balance,
            interest,
            cumulative_interest,
        });
    }

    schedule
}
