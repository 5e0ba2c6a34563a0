use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{derive_financing, FinancingMetrics, LoanTerms};
use crate::parse::lenient;
use crate::ratios::compute_yield;
use crate::tables::RateTableProvider;
use crate::time_value::annualize;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Single-let buy-to-let inputs. Percentages arrive as whole percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BtlInput {
    #[serde(default, with = "lenient::money")]
    pub purchase_price: Money,
    #[serde(default, with = "lenient::money")]
    pub monthly_rent: Money,
    #[serde(default, with = "lenient::percent")]
    pub deposit_pct: Rate,
    /// Annual contract rate; omitted means "look up from the LTV bands"
    #[serde(
        default,
        with = "lenient::optional_percent",
        skip_serializing_if = "Option::is_none"
    )]
    pub interest_rate: Option<Rate>,
    /// Letting / management fee as a share of rent
    #[serde(default, with = "lenient::percent")]
    pub management_pct: Rate,
    /// Maintenance allowance as a share of rent
    #[serde(default, with = "lenient::percent")]
    pub maintenance_pct: Rate,
    /// Void allowance as a share of rent
    #[serde(default, with = "lenient::percent")]
    pub void_pct: Rate,
    /// Landlord insurance per year
    #[serde(default, with = "lenient::money")]
    pub insurance_annual: Money,
    /// Ground rent, service charge, compliance certificates etc.
    #[serde(default, with = "lenient::money")]
    pub other_costs_annual: Money,
    /// Override for the lender ICR stress rate
    #[serde(
        default,
        with = "lenient::optional_percent",
        skip_serializing_if = "Option::is_none"
    )]
    pub stress_rate: Option<Rate>,
    /// If set, also report a capital-and-interest payment over this term
    #[serde(
        default,
        with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub repayment_term_years: Option<u32>,
}

/// Annual operating costs, itemised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BtlOperatingCosts {
    pub management_cost: Money,
    pub maintenance_cost: Money,
    pub void_cost: Money,
    pub insurance_cost: Money,
    pub other_costs: Money,
    pub total_operating_costs: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BtlMetrics {
    pub annual_rent: Money,
    /// annual rent / purchase price
    pub gross_yield: Rate,
    #[serde(flatten)]
    pub operating_costs: BtlOperatingCosts,
    /// annual rent - operating costs
    pub net_operating_income: Money,
    /// NOI / purchase price
    pub net_yield: Rate,
    #[serde(flatten)]
    pub financing: FinancingMetrics,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Yields, cashflow and coverage ratios for an interest-only buy-to-let.
pub fn derive_btl(
    input: &BtlInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<BtlMetrics> {
    trace!("derive_btl: {input:?}");
    let mut warnings: Vec<String> = Vec::new();

    let annual_rent = annualize(input.monthly_rent);
    let gross_yield = compute_yield(annual_rent, input.purchase_price);

    let operating_costs = operating_costs(input, annual_rent);
    let net_operating_income = annual_rent - operating_costs.total_operating_costs;
    let net_yield = compute_yield(net_operating_income, input.purchase_price);

    if input.purchase_price.is_zero() {
        warnings.push("Purchase price is zero — yields reported as 0".into());
    }

    let financing = derive_financing(
        &LoanTerms {
            purchase_price: input.purchase_price,
            deposit_pct: input.deposit_pct,
            interest_rate: input.interest_rate,
            stress_rate: input.stress_rate,
            repayment_term_years: input.repayment_term_years,
        },
        annual_rent,
        net_operating_income,
        tables,
        &mut warnings,
    );

    let output = BtlMetrics {
        annual_rent,
        gross_yield,
        operating_costs,
        net_operating_income,
        net_yield,
        financing,
    };

    with_metadata(
        "Buy-to-Let Yield & Cashflow (interest-only)",
        input,
        warnings,
        tables.version(),
        output,
    )
}

fn operating_costs(input: &BtlInput, annual_rent: Money) -> BtlOperatingCosts {
    let management_cost = annual_rent * input.management_pct;
    let maintenance_cost = annual_rent * input.maintenance_pct;
    let void_cost = annual_rent * input.void_pct;
    let total_operating_costs = [
        management_cost,
        maintenance_cost,
        void_cost,
        input.insurance_annual,
        input.other_costs_annual,
    ]
    .iter()
    .copied()
    .sum::<Decimal>();

    BtlOperatingCosts {
        management_cost,
        maintenance_cost,
        void_cost,
        insurance_cost: input.insurance_annual,
        other_costs: input.other_costs_annual,
        total_operating_costs,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
