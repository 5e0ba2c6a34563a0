use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{derive_financing, FinancingMetrics, LoanTerms};
use crate::parse::lenient;
use crate::ratios::{compute_yield, safe_div};
use crate::tables::RateTableProvider;
use crate::time_value::{annualize, monthly_from_annual};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

/// Mandatory HMO licences run for five years; the fee is spread evenly.
pub const LICENCE_TERM_YEARS: u32 = 5;

const STRONG_NET_YIELD: Rate = dec!(0.08);
const VIABLE_NET_YIELD: Rate = dec!(0.06);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HmoInput {
    #[serde(default, with = "lenient::money")]
    pub purchase_price: Money,
    #[serde(default, with = "lenient::count")]
    pub room_count: u32,
    /// Monthly rent per room, bills included
    #[serde(default, with = "lenient::money")]
    pub rent_per_room: Money,
    #[serde(default, with = "lenient::percent")]
    pub deposit_pct: Rate,
    #[serde(
        default,
        with = "lenient::optional_percent",
        skip_serializing_if = "Option::is_none"
    )]
    pub interest_rate: Option<Rate>,
    #[serde(default, with = "lenient::percent")]
    pub management_pct: Rate,
    #[serde(default, with = "lenient::percent")]
    pub maintenance_pct: Rate,
    #[serde(default, with = "lenient::percent")]
    pub void_pct: Rate,
    #[serde(default, with = "lenient::money")]
    pub insurance_annual: Money,
    /// Utilities, broadband and council tax paid by the landlord, per month
    #[serde(default, with = "lenient::money")]
    pub bills_monthly: Money,
    /// Licence fee for the full five-year term
    #[serde(default, with = "lenient::money")]
    pub licence_fee: Money,
    #[serde(default, with = "lenient::money")]
    pub other_costs_annual: Money,
    #[serde(
        default,
        with = "lenient::optional_percent",
        skip_serializing_if = "Option::is_none"
    )]
    pub stress_rate: Option<Rate>,
    #[serde(
        default,
        with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub repayment_term_years: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HmoViability {
    /// Net yield of 8% or more with positive cashflow
    Strong,
    /// Net yield of 6% or more with positive cashflow
    Viable,
    /// Positive cashflow but thin yield
    Marginal,
    /// Cashflow does not cover mortgage interest
    Unviable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmoOperatingCosts {
    pub management_cost: Money,
    pub maintenance_cost: Money,
    pub void_cost: Money,
    pub insurance_cost: Money,
    pub bills_annual: Money,
    /// licence fee / 5
    pub licence_cost_annual: Money,
    pub other_costs: Money,
    pub total_operating_costs: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmoMetrics {
    pub room_count: u32,
    /// room count * rent per room
    pub monthly_gross_rent: Money,
    pub annual_rent: Money,
    pub gross_yield: Rate,
    #[serde(flatten)]
    pub operating_costs: HmoOperatingCosts,
    pub net_operating_income: Money,
    pub net_yield: Rate,
    #[serde(flatten)]
    pub financing: FinancingMetrics,
    pub noi_per_room: Money,
    pub monthly_cashflow_per_room: Money,
    pub viability: HmoViability,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// HMO viability: BTL metrics over blended room rents, with bills and the
/// amortised licence fee as extra cost lines.
pub fn derive_hmo(
    input: &HmoInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<HmoMetrics> {
    trace!("derive_hmo: {input:?}");
    let mut warnings: Vec<String> = Vec::new();

    let rooms = Decimal::from(input.room_count);
    let monthly_gross_rent = rooms * input.rent_per_room;
    let annual_rent = annualize(monthly_gross_rent);
    let gross_yield = compute_yield(annual_rent, input.purchase_price);

    let operating_costs = operating_costs(input, annual_rent);
    let net_operating_income = annual_rent - operating_costs.total_operating_costs;
    let net_yield = compute_yield(net_operating_income, input.purchase_price);

    if input.room_count == 0 {
        warnings.push("No lettable rooms — rent is zero".into());
    } else if input.room_count < 3 {
        warnings.push(format!(
            "{} rooms is below the usual 3-tenant HMO threshold; licensing may not apply",
            input.room_count
        ));
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

    let noi_per_room = safe_div(net_operating_income, rooms);
    let monthly_cashflow_per_room = safe_div(financing.monthly_cashflow, rooms);
    let viability = classify(net_yield, financing.annual_cashflow);

    let output = HmoMetrics {
        room_count: input.room_count,
        monthly_gross_rent,
        annual_rent,
        gross_yield,
        operating_costs,
        net_operating_income,
        net_yield,
        financing,
        noi_per_room,
        monthly_cashflow_per_room,
        viability,
    };

    with_metadata(
        "HMO Viability (room-by-room rent, amortised licence)",
        input,
        warnings,
        tables.version(),
        output,
    )
}

fn operating_costs(input: &HmoInput, annual_rent: Money) -> HmoOperatingCosts {
    let management_cost = annual_rent * input.management_pct;
    let maintenance_cost = annual_rent * input.maintenance_pct;
    let void_cost = annual_rent * input.void_pct;
    let bills_annual = annualize(input.bills_monthly);
    let licence_cost_annual = input.licence_fee / Decimal::from(LICENCE_TERM_YEARS);

    let total_operating_costs = management_cost
        + maintenance_cost
        + void_cost
        + input.insurance_annual
        + bills_annual
        + licence_cost_annual
        + input.other_costs_annual;

    HmoOperatingCosts {
        management_cost,
        maintenance_cost,
        void_cost,
        insurance_cost: input.insurance_annual,
        bills_annual,
        licence_cost_annual,
        other_costs: input.other_costs_annual,
        total_operating_costs,
    }
}

fn classify(net_yield: Rate, annual_cashflow: Money) -> HmoViability {
    if annual_cashflow <= Decimal::ZERO {
        HmoViability::Unviable
    } else if net_yield >= STRONG_NET_YIELD {
        HmoViability::Strong
    } else if net_yield >= VIABLE_NET_YIELD {
        HmoViability::Viable
    } else {
        HmoViability::Marginal
    }
}

/// Blended monthly rent per room implied by a target gross yield.
pub fn rent_per_room_for_yield(purchase_price: Money, room_count: u32, target_yield: Rate) -> Money {
    let annual = purchase_price * target_yield;
    safe_div(monthly_from_annual(annual), Decimal::from(room_count))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
