use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parse::lenient;
use crate::ratios::safe_div;
use crate::tables::RateTableProvider;
use crate::time_value::{amortize_rolled_interest, annualize, RolledMonth};
use crate::types::{with_metadata, ComputationOutput, Money, Months, Rate, RateSource};

/// Simulations stop here; longer terms are not bridging finance.
pub const MAX_SIMULATED_MONTHS: Months = 360;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgingInput {
    /// Gross loan
    #[serde(default, with = "lenient::money")]
    pub principal: Money,
    /// Security value, used for LTV and the rate lookup
    #[serde(default, with = "lenient::money")]
    pub property_value: Money,
    /// Monthly rate as whole percent (0.85 = 0.85% a month). Omitted means
    /// "look up from the LTV bands".
    #[serde(
        default,
        with = "lenient::optional_percent",
        skip_serializing_if = "Option::is_none"
    )]
    pub monthly_rate: Option<Rate>,
    #[serde(default, with = "lenient::count")]
    pub term_months: Months,
    /// Month the loan is actually redeemed; defaults to the full term
    #[serde(
        default,
        with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_month: Option<Months>,
    #[serde(default, with = "lenient::percent")]
    pub arrangement_fee_pct: Rate,
    #[serde(default, with = "lenient::percent")]
    pub exit_fee_pct: Rate,
}

/// Interest deducted from the advance on day one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainedInterest {
    /// principal * monthly rate * term
    pub total_interest: Money,
    /// principal - retained interest
    pub net_advance: Money,
    /// net advance less the arrangement fee
    pub net_day_one_advance: Money,
    /// interest + arrangement fee + exit fee; fixed whatever the exit month
    pub total_cost: Money,
}

/// Interest compounded onto the balance and repaid at exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolledInterest {
    pub balance_at_exit: Money,
    /// balance at exit - principal
    pub interest_at_exit: Money,
    pub interest_at_term: Money,
    /// balance at exit + exit fee
    pub redemption_amount: Money,
    /// interest at exit + arrangement fee + exit fee
    pub total_cost_at_exit: Money,
    pub schedule: Vec<RolledMonth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheaperOption {
    Retained,
    Rolled,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgingMetrics {
    pub ltv: Rate,
    pub monthly_rate: Rate,
    pub monthly_rate_source: RateSource,
    /// monthly rate * 12
    pub annualised_rate: Rate,
    pub term_months: Months,
    pub exit_month: Months,
    pub arrangement_fee: Money,
    pub exit_fee: Money,
    pub retained: RetainedInterest,
    pub rolled: RolledInterest,
    /// First month whose rolled interest strictly exceeds the retained interest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossover_month: Option<Months>,
    pub cheaper_at_exit: CheaperOption,
    /// |retained interest - rolled interest at exit|
    pub saving_at_exit: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare retained and rolled-up interest on a bridging loan.
pub fn derive_bridging(
    input: &BridgingInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<BridgingMetrics> {
    trace!("derive_bridging: {input:?}");
    let mut warnings: Vec<String> = Vec::new();

    let principal = input.principal;
    let ltv = safe_div(principal, input.property_value);

    let (monthly_rate, monthly_rate_source) = match input.monthly_rate {
        Some(rate) => (rate, RateSource::Input),
        None => {
            if input.property_value.is_zero() {
                warnings.push(
                    "No monthly rate or property value given — using the lowest LTV band".into(),
                );
            }
            (*tables.bridging_rate_bands().lookup(ltv), RateSource::LtvBand)
        }
    };

    let mut term_months = input.term_months;
    if term_months > MAX_SIMULATED_MONTHS {
        warnings.push(format!(
            "Term of {term_months} months capped at {MAX_SIMULATED_MONTHS}"
        ));
        term_months = MAX_SIMULATED_MONTHS;
    }

    let mut exit_month = input.exit_month.unwrap_or(term_months);
    if exit_month > MAX_SIMULATED_MONTHS {
        exit_month = MAX_SIMULATED_MONTHS;
    }
    if exit_month > term_months {
        warnings.push(format!(
            "Exit in month {exit_month} is after the {term_months}-month term — retained interest does not cover the overrun"
        ));
    }

    let arrangement_fee = principal * input.arrangement_fee_pct;
    let exit_fee = principal * input.exit_fee_pct;
    let fees = arrangement_fee.saturating_add(exit_fee);

    // --- Retained ---
    let retained_interest = principal
        .saturating_mul(monthly_rate)
        .saturating_mul(Decimal::from(term_months));
    let net_advance = principal.saturating_sub(retained_interest);
    let retained = RetainedInterest {
        total_interest: retained_interest,
        net_advance,
        net_day_one_advance: net_advance.saturating_sub(arrangement_fee),
        total_cost: retained_interest.saturating_add(fees),
    };

    // --- Rolled ---
    let simulated_months = term_months.max(exit_month);
    let schedule = amortize_rolled_interest(principal, monthly_rate, simulated_months);
    if schedule.len() < simulated_months as usize {
        warnings.push(format!(
            "Rolled balance exceeds representable range after month {}; later months hold that balance",
            schedule.len()
        ));
    }
    let balance_at = |month: Months| -> Money {
        if month == 0 {
            return principal;
        }
        schedule
            .get((month - 1) as usize)
            .or(schedule.last())
            .map_or(principal, |m| m.balance)
    };
    let balance_at_exit = balance_at(exit_month);
    let interest_at_exit = balance_at_exit.saturating_sub(principal);
    let interest_at_term = balance_at(term_months).saturating_sub(principal);
    let within_term = schedule.len().min(term_months as usize);
    let crossover_month = find_crossover(&schedule[..within_term], retained_interest);

    let rolled = RolledInterest {
        balance_at_exit,
        interest_at_exit,
        interest_at_term,
        redemption_amount: balance_at_exit.saturating_add(exit_fee),
        total_cost_at_exit: interest_at_exit.saturating_add(fees),
        schedule,
    };

    let cheaper_at_exit = match interest_at_exit.cmp(&retained_interest) {
        std::cmp::Ordering::Less => CheaperOption::Rolled,
        std::cmp::Ordering::Greater => CheaperOption::Retained,
        std::cmp::Ordering::Equal => CheaperOption::Equal,
    };

    if net_advance < Decimal::ZERO {
        warnings.push("Retained interest exceeds the gross loan".into());
    }

    let output = BridgingMetrics {
        ltv,
        monthly_rate,
        monthly_rate_source,
        annualised_rate: annualize(monthly_rate),
        term_months,
        exit_month,
        arrangement_fee,
        exit_fee,
        retained,
        rolled,
        crossover_month,
        cheaper_at_exit,
        saving_at_exit: retained_interest.saturating_sub(interest_at_exit).abs(),
    };

    with_metadata(
        "Bridging Finance: Retained vs Rolled Interest",
        input,
        warnings,
        tables.version(),
        output,
    )
}

/// Scan the schedule (callers pass the months within the term) for the first month whose cumulative rolled
/// interest strictly exceeds `retained_interest`.
pub fn find_crossover(schedule: &[RolledMonth], retained_interest: Money) -> Option<Months> {
    schedule
        .iter()
        .find(|m| m.cumulative_interest > retained_interest)
        .map(|m| m.month)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
