pub mod btl;
pub mod hmo;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::format;
use crate::ratios::{cash_on_cash, compute_dscr, compute_icr};
use crate::tables::RateTableProvider;
use crate::time_value::{annualize, interest_only_monthly, monthly_from_annual, repayment_monthly};
use crate::types::{Money, Multiple, Rate};

pub use crate::types::RateSource;

/// DSCR below this draws a lender-covenant warning.
const DSCR_WARNING_THRESHOLD: Decimal = dec!(1.25);

/// Longest repayment term amortised; longer terms are capped with a warning.
pub const MAX_REPAYMENT_TERM_YEARS: u32 = 40;

/// Mortgage, cashflow and coverage metrics shared by BTL and HMO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingMetrics {
    pub deposit: Money,
    pub mortgage_amount: Money,
    /// mortgage / purchase price
    pub ltv: Rate,
    pub interest_rate: Rate,
    pub interest_rate_source: RateSource,
    /// Interest-only monthly payment at the contract rate
    pub monthly_mortgage_payment: Money,
    pub annual_mortgage_interest: Money,
    /// Capital-and-interest payment when a repayment term is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repayment_monthly_payment: Option<Money>,
    /// NOI - annual mortgage interest
    pub annual_cashflow: Money,
    pub monthly_cashflow: Money,
    /// annual cashflow / deposit
    pub cash_on_cash: Rate,
    /// NOI / annual mortgage interest
    pub dscr: Multiple,
    /// Annual gross rent / (mortgage * stress rate)
    pub icr: Multiple,
    pub icr_stress_rate: Rate,
    pub icr_passes_basic_rate: bool,
    pub icr_passes_higher_rate: bool,
}

/// The loan-side inputs common to the lettings derivers.
pub(crate) struct LoanTerms {
    pub purchase_price: Money,
    pub deposit_pct: Rate,
    pub interest_rate: Option<Rate>,
    pub stress_rate: Option<Rate>,
    pub repayment_term_years: Option<u32>,
}

pub(crate) fn derive_financing(
    loan: &LoanTerms,
    annual_rent: Money,
    net_operating_income: Money,
    tables: &dyn RateTableProvider,
    warnings: &mut Vec<String>,
) -> FinancingMetrics {
    let deposit = loan.purchase_price * loan.deposit_pct;
    let mortgage_amount = loan.purchase_price * (Decimal::ONE - loan.deposit_pct);
    let ltv = Decimal::ONE - loan.deposit_pct;

    let (interest_rate, interest_rate_source) = match loan.interest_rate {
        Some(rate) => (rate, RateSource::Input),
        None => (*tables.btl_rate_bands().lookup(ltv), RateSource::LtvBand),
    };

    let monthly_mortgage_payment = interest_only_monthly(mortgage_amount, interest_rate);
    let annual_mortgage_interest = annualize(monthly_mortgage_payment);

    let repayment_monthly_payment = loan
        .repayment_term_years
        .filter(|years| *years > 0)
        .map(|years| {
            if years > MAX_REPAYMENT_TERM_YEARS {
                warnings.push(format!(
                    "Repayment term of {years} years capped at {MAX_REPAYMENT_TERM_YEARS}"
                ));
            }
            let months = years.min(MAX_REPAYMENT_TERM_YEARS).saturating_mul(12);
            repayment_monthly(mortgage_amount, interest_rate, months)
        });

    let annual_cashflow = net_operating_income - annual_mortgage_interest;
    let monthly_cashflow = monthly_from_annual(annual_cashflow);

    let icr_params = tables.icr();
    let icr_stress_rate = loan.stress_rate.unwrap_or(icr_params.stress_rate);
    let icr = compute_icr(annual_rent, mortgage_amount, icr_stress_rate);
    let has_debt = !mortgage_amount.is_zero();

    let dscr = compute_dscr(net_operating_income, annual_mortgage_interest);

    // --- Warnings ---
    if ltv > Decimal::ONE {
        warnings.push(format!(
            "LTV of {} exceeds 100% — deposit is negative",
            format::percent(ltv)
        ));
    }
    if has_debt && dscr > Decimal::ZERO && dscr < DSCR_WARNING_THRESHOLD {
        warnings.push(format!(
            "DSCR of {} is below {} — lender covenant risk",
            format::ratio(dscr),
            format::ratio(DSCR_WARNING_THRESHOLD)
        ));
    }
    if has_debt && icr < icr_params.basic_rate_threshold {
        warnings.push(format!(
            "ICR of {} at a {} stress rate fails the {} lender test",
            format::ratio(icr),
            format::percent(icr_stress_rate),
            format::ratio(icr_params.basic_rate_threshold)
        ));
    }
    if annual_cashflow < Decimal::ZERO {
        warnings.push("Negative cashflow after mortgage interest".into());
    }

    FinancingMetrics {
        deposit,
        mortgage_amount,
        ltv,
        interest_rate,
        interest_rate_source,
        monthly_mortgage_payment,
        annual_mortgage_interest,
        repayment_monthly_payment,
        annual_cashflow,
        monthly_cashflow,
        cash_on_cash: cash_on_cash(annual_cashflow, deposit),
        dscr,
        icr,
        icr_stress_rate,
        icr_passes_basic_rate: !has_debt || icr >= icr_params.basic_rate_threshold,
        icr_passes_higher_rate: !has_debt || icr >= icr_params.higher_rate_threshold,
    }
}
