use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format;
use crate::parse::lenient;
use crate::ratios::safe_div;
use crate::tables::{normalize_key, PropertyTaxParameters, RateTableProvider};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Annual rental income and itemised expenses for one let.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FhlTaxInput {
    #[serde(default, with = "lenient::money")]
    pub gross_income: Money,
    #[serde(default, with = "lenient::money")]
    pub mortgage_interest: Money,
    #[serde(default, with = "lenient::money")]
    pub cleaning: Money,
    #[serde(default, with = "lenient::money")]
    pub utilities: Money,
    #[serde(default, with = "lenient::money")]
    pub insurance: Money,
    #[serde(default, with = "lenient::money")]
    pub management: Money,
    #[serde(default, with = "lenient::money")]
    pub maintenance: Money,
    #[serde(default, with = "lenient::money")]
    pub other_expenses: Money,
    /// basic, higher or additional
    #[serde(default)]
    pub tax_bracket: String,
    #[serde(default, with = "lenient::count")]
    pub days_available: u32,
    #[serde(default, with = "lenient::count")]
    pub days_let: u32,
    /// Employment and other taxable income. When given, income tax is the
    /// banded increment over it instead of a flat bracket rate.
    #[serde(
        default,
        with = "lenient::optional_money",
        skip_serializing_if = "Option::is_none"
    )]
    pub other_income: Option<Money>,
}

/// Outcome of the furnished holiday let occupancy tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FhlGate {
    pub days_available: u32,
    pub days_let: u32,
    pub min_days_available: u32,
    pub min_days_let: u32,
    pub availability_test_passed: bool,
    pub letting_test_passed: bool,
    pub qualifies: bool,
    pub explanation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTreatment {
    pub deductible_expenses: Money,
    /// max(income - deductible, 0)
    pub taxable_profit: Money,
    /// Income tax before any finance cost credit
    pub income_tax: Money,
    /// Basic-rate credit actually used; never more than the income tax
    pub finance_cost_credit: Money,
    pub class4_levy: Money,
    pub total_tax: Money,
    /// income - all expenses - total tax
    pub after_tax_cashflow: Money,
    /// total tax / gross income
    pub effective_tax_rate: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTaxMethod {
    FlatBracket,
    Banded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FhlTaxMetrics {
    pub tax_bracket: String,
    pub marginal_rate: Rate,
    pub income_tax_method: IncomeTaxMethod,
    pub total_expenses: Money,
    /// income - all expenses
    pub pre_tax_cashflow: Money,
    pub gate: FhlGate,
    pub fhl: TaxTreatment,
    pub section24: TaxTreatment,
    /// Section 24 tax - FHL tax; positive means FHL treatment saves tax
    pub fhl_advantage: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare FHL treatment with the Section 24 finance-cost restriction.
///
/// Both treatments are computed from the same inputs. The FHL gate is
/// reported alongside but never alters either computation.
pub fn derive_fhl_tax(
    input: &FhlTaxInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<FhlTaxMetrics> {
    trace!("derive_fhl_tax: {input:?}");
    let mut warnings: Vec<String> = Vec::new();
    let params = tables.property_tax();

    let marginal_rate = tables.marginal_tax_rate(&input.tax_bracket);
    let income_tax_method = if input.other_income.is_some() {
        IncomeTaxMethod::Banded
    } else {
        IncomeTaxMethod::FlatBracket
    };
    let income_tax_on = |taxable: Money| -> Money {
        match input.other_income {
            Some(other) => {
                let schedule = tables.income_tax_schedule();
                schedule.marginal_total(other + taxable) - schedule.marginal_total(other)
            }
            None => taxable * marginal_rate,
        }
    };

    let non_interest_expenses = input.cleaning
        + input.utilities
        + input.insurance
        + input.management
        + input.maintenance
        + input.other_expenses;
    let total_expenses = non_interest_expenses + input.mortgage_interest;
    let pre_tax_cashflow = input.gross_income - total_expenses;

    // --- FHL: interest fully deductible, trading-style levy on profit ---
    let fhl_taxable = (input.gross_income - total_expenses).max(Decimal::ZERO);
    let fhl_income_tax = income_tax_on(fhl_taxable);
    let class4_levy = (fhl_taxable - params.class4_threshold).max(Decimal::ZERO) * params.class4_rate;
    let fhl_total = fhl_income_tax + class4_levy;
    let fhl = TaxTreatment {
        deductible_expenses: total_expenses,
        taxable_profit: fhl_taxable,
        income_tax: fhl_income_tax,
        finance_cost_credit: Decimal::ZERO,
        class4_levy,
        total_tax: fhl_total,
        after_tax_cashflow: pre_tax_cashflow - fhl_total,
        effective_tax_rate: safe_div(fhl_total, input.gross_income),
    };

    // --- Section 24: interest replaced by a basic-rate credit ---
    let s24_taxable = (input.gross_income - non_interest_expenses).max(Decimal::ZERO);
    let s24_income_tax = income_tax_on(s24_taxable);
    let full_credit = input.mortgage_interest * params.finance_cost_credit_rate;
    let finance_cost_credit = full_credit.min(s24_income_tax).max(Decimal::ZERO);
    let s24_total = s24_income_tax - finance_cost_credit;
    let section24 = TaxTreatment {
        deductible_expenses: non_interest_expenses,
        taxable_profit: s24_taxable,
        income_tax: s24_income_tax,
        finance_cost_credit,
        class4_levy: Decimal::ZERO,
        total_tax: s24_total,
        after_tax_cashflow: pre_tax_cashflow - s24_total,
        effective_tax_rate: safe_div(s24_total, input.gross_income),
    };

    let gate = fhl_gate(input.days_available, input.days_let, params);
    if !gate.qualifies {
        warnings.push("Property does not meet the FHL occupancy tests".into());
    }
    if full_credit > finance_cost_credit {
        warnings.push(format!(
            "Unused finance cost credit of {} (carried forward in practice)",
            format::gbp(full_credit - finance_cost_credit)
        ));
    }

    let output = FhlTaxMetrics {
        tax_bracket: normalize_key(&input.tax_bracket),
        marginal_rate,
        income_tax_method,
        total_expenses,
        pre_tax_cashflow,
        gate,
        fhl_advantage: s24_total - fhl_total,
        fhl,
        section24,
    };

    with_metadata(
        "FHL vs Section 24 rental income tax",
        input,
        warnings,
        tables.version(),
        output,
    )
}

/// The availability and letting-days tests, with a line of explanation each.
pub fn fhl_gate(days_available: u32, days_let: u32, params: &PropertyTaxParameters) -> FhlGate {
    let availability_test_passed = days_available >= params.fhl_min_days_available;
    let letting_test_passed = days_let >= params.fhl_min_days_let;

    let verdict = |passed: bool| if passed { "pass" } else { "fail" };
    let explanation = vec![
        format!(
            "Availability: {days_available} of {} required days ({})",
            params.fhl_min_days_available,
            verdict(availability_test_passed)
        ),
        format!(
            "Letting: {days_let} of {} required days ({})",
            params.fhl_min_days_let,
            verdict(letting_test_passed)
        ),
    ];

    FhlGate {
        days_available,
        days_let,
        min_days_available: params.fhl_min_days_available,
        min_days_let: params.fhl_min_days_let,
        availability_test_passed,
        letting_test_passed,
        qualifies: availability_test_passed && letting_test_passed,
        explanation,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
