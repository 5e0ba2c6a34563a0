use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::parse::lenient;
use crate::ratios::safe_div;
use crate::tables::RateTableProvider;
use crate::time_value::annualize;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

pub const DEFAULT_NIGHTS_PER_MONTH: u32 = 30;

/// Occupancy levels reported in every serviced-accommodation run.
pub const STANDARD_OCCUPANCIES: [Rate; 5] = [dec!(0.40), dec!(0.50), dec!(0.60), dec!(0.70), dec!(0.80)];

/// Break-even cashflow recomputed from first principles must be within a penny of zero.
pub const BREAKEVEN_TOLERANCE: Money = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicedInput {
    /// Average daily rate charged to guests
    #[serde(default, with = "lenient::money")]
    pub adr: Money,
    /// Booking platform commission on room revenue
    #[serde(default, with = "lenient::percent")]
    pub platform_fee_pct: Rate,
    /// Cleaning fee charged to the guest per stay
    #[serde(default, with = "lenient::money")]
    pub cleaning_fee: Money,
    /// Cleaner's cost per changeover
    #[serde(default, with = "lenient::money")]
    pub cleaning_cost: Money,
    #[serde(default, with = "lenient::money")]
    pub average_stay_nights: Decimal,
    /// Linen, consumables and utilities per occupied night
    #[serde(default, with = "lenient::money")]
    pub variable_cost_per_night: Money,
    #[serde(default, with = "lenient::money")]
    pub monthly_fixed_costs: Money,
    #[serde(default, with = "lenient::money")]
    pub monthly_mortgage: Money,
    #[serde(default, with = "lenient::percent")]
    pub base_occupancy_pct: Rate,
    #[serde(
        default,
        with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub nights_per_month: Option<u32>,
}

impl ServicedInput {
    pub fn nights_per_month(&self) -> u32 {
        self.nights_per_month.unwrap_or(DEFAULT_NIGHTS_PER_MONTH)
    }
}

/// One month of trading at a given number of occupied nights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    pub occupancy: Rate,
    pub nights: Decimal,
    pub stays: Decimal,
    pub room_revenue: Money,
    pub platform_fees: Money,
    pub cleaning_income: Money,
    pub cleaning_costs: Money,
    pub variable_costs: Money,
    pub fixed_costs: Money,
    pub mortgage: Money,
    pub monthly_cashflow: Money,
    pub annual_cashflow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicedMetrics {
    pub nights_per_month: u32,
    /// ADR net of fees plus per-night cleaning margin, less variable cost
    pub net_per_night: Money,
    pub breakeven_achievable: bool,
    pub breakeven_nights: Decimal,
    pub breakeven_occupancy: Rate,
    /// Cashflow at break-even nights, recomputed line by line, is within a penny of zero
    pub breakeven_consistent: bool,
    pub base: MonthlyBreakdown,
    pub scenarios: Vec<MonthlyBreakdown>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Serviced accommodation break-even and occupancy scenarios.
pub fn derive_serviced_accommodation(
    input: &ServicedInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<ServicedMetrics> {
    trace!("derive_serviced_accommodation: {input:?}");
    let mut warnings: Vec<String> = Vec::new();

    let nights_per_month = input.nights_per_month();
    if nights_per_month == 0 {
        warnings.push("Nights per month is zero — occupancy figures reported as 0".into());
    }
    if input.average_stay_nights.is_zero() {
        warnings.push("Average stay is zero — cleaning margin ignored".into());
    }

    let net_per_night = net_per_night(input);
    let monthly_outgoings = input.monthly_fixed_costs + input.monthly_mortgage;

    let breakeven_achievable = net_per_night > Decimal::ZERO;
    let breakeven_nights = if breakeven_achievable {
        monthly_outgoings / net_per_night
    } else {
        warnings.push("Net income per night is not positive — break-even is unreachable".into());
        Decimal::ZERO
    };
    let npm = Decimal::from(nights_per_month);
    let breakeven_occupancy = safe_div(breakeven_nights, npm);
    if breakeven_achievable && breakeven_nights > npm {
        warnings.push(format!(
            "Break-even needs {breakeven_nights:.1} nights, more than the {nights_per_month} available"
        ));
    }

    let breakeven_consistent = breakeven_achievable
        && monthly_breakdown(input, breakeven_nights)
            .monthly_cashflow
            .abs()
            < BREAKEVEN_TOLERANCE;

    let base = at_occupancy(input, input.base_occupancy_pct);
    let scenarios = STANDARD_OCCUPANCIES
        .iter()
        .map(|occ| at_occupancy(input, *occ))
        .collect();

    let output = ServicedMetrics {
        nights_per_month,
        net_per_night,
        breakeven_achievable,
        breakeven_nights,
        breakeven_occupancy,
        breakeven_consistent,
        base,
        scenarios,
    };

    with_metadata(
        "Serviced Accommodation Break-even (net per night)",
        input,
        warnings,
        tables.version(),
        output,
    )
}

/// `ADR * (1 - fee) + (cleaning fee - cleaning cost) / stay - variable cost`
pub fn net_per_night(input: &ServicedInput) -> Money {
    input.adr * (Decimal::ONE - input.platform_fee_pct)
        + safe_div(input.cleaning_fee - input.cleaning_cost, input.average_stay_nights)
        - input.variable_cost_per_night
}

/// Trading month at `occupancy` of the available nights.
pub fn at_occupancy(input: &ServicedInput, occupancy: Rate) -> MonthlyBreakdown {
    let nights = occupancy * Decimal::from(input.nights_per_month());
    let mut month = monthly_breakdown(input, nights);
    month.occupancy = occupancy;
    month
}

/// Line-by-line month at a given number of occupied nights. Does not use
/// [`net_per_night`], so it serves as an independent check on it.
pub fn monthly_breakdown(input: &ServicedInput, nights: Decimal) -> MonthlyBreakdown {
    let stays = safe_div(nights, input.average_stay_nights);
    let room_revenue = input.adr * nights;
    let platform_fees = room_revenue * input.platform_fee_pct;
    let cleaning_income = stays * input.cleaning_fee;
    let cleaning_costs = stays * input.cleaning_cost;
    let variable_costs = nights * input.variable_cost_per_night;

    let monthly_cashflow = room_revenue - platform_fees + cleaning_income
        - cleaning_costs
        - variable_costs
        - input.monthly_fixed_costs
        - input.monthly_mortgage;

    MonthlyBreakdown {
        occupancy: safe_div(nights, Decimal::from(input.nights_per_month())),
        nights,
        stays,
        room_revenue,
        platform_fees,
        cleaning_income,
        cleaning_costs,
        variable_costs,
        fixed_costs: input.monthly_fixed_costs,
        mortgage: input.monthly_mortgage,
        monthly_cashflow,
        annual_cashflow: annualize(monthly_cashflow),
    }
}

/// Monthly cashflow at an occupancy level.
pub fn monthly_cashflow_at(input: &ServicedInput, occupancy: Rate) -> Money {
    at_occupancy(input, occupancy).monthly_cashflow
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
