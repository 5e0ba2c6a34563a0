use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::format;
use crate::parse::lenient;
use crate::ratios::safe_div;
use crate::tables::{normalize_key, RateTableProvider};
use crate::types::{with_metadata, ComputationOutput, Money, Months, Rate};

/// Build spend is drawn progressively; on average half is outstanding.
const BUILD_DRAWDOWN_FACTOR: Decimal = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentInput {
    /// Gross development value of the completed scheme
    #[serde(default, with = "lenient::money")]
    pub gdv: Money,
    #[serde(default, with = "lenient::money")]
    pub land_price: Money,
    /// SDLT, legals and agent fees as a share of the land price
    #[serde(default, with = "lenient::percent")]
    pub acquisition_costs_pct: Rate,
    #[serde(default, with = "lenient::money")]
    pub gross_internal_area_sqm: Money,
    /// National-average build cost per sqm, before the regional multiplier
    #[serde(default, with = "lenient::money")]
    pub build_cost_per_sqm: Money,
    #[serde(default)]
    pub region: String,
    #[serde(default, with = "lenient::percent")]
    pub professional_fees_pct: Rate,
    #[serde(default, with = "lenient::percent")]
    pub contingency_pct: Rate,
    /// Annual development finance rate
    #[serde(default, with = "lenient::percent")]
    pub finance_rate: Rate,
    #[serde(default, with = "lenient::count")]
    pub build_period_months: Months,
    /// Agency and legal costs on sale, as a share of GDV
    #[serde(default, with = "lenient::percent")]
    pub sales_costs_pct: Rate,
    #[serde(default, with = "lenient::money")]
    pub cil_liability: Money,
    /// Developer's required profit as a share of GDV
    #[serde(default, with = "lenient::percent")]
    pub target_profit_pct: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentCosts {
    pub land_price: Money,
    pub acquisition_costs: Money,
    pub regional_multiplier: Decimal,
    pub build_cost: Money,
    pub professional_fees: Money,
    pub contingency: Money,
    pub cil_liability: Money,
    pub land_finance: Money,
    pub build_finance: Money,
    pub finance_cost: Money,
    pub sales_costs: Money,
    pub total_development_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentMetrics {
    pub region: String,
    pub gdv: Money,
    #[serde(flatten)]
    pub costs: DevelopmentCosts,
    /// GDV - total development cost
    pub profit: Money,
    pub profit_on_cost: Rate,
    pub profit_on_gdv: Rate,
    pub target_profit: Money,
    /// Land price at which profit equals the target
    pub residual_land_value: Money,
    pub viable: bool,
    pub gdv_per_sqm: Money,
    pub cost_per_sqm: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Residual development appraisal.
///
/// Finance is simple interest over the build period: the land loan is drawn
/// in full on day one, build spend is drawn evenly. The residual land value
/// solves for the land price that yields exactly the target profit under the
/// same cost model, so acquisition costs and land finance scale with it.
pub fn derive_development_appraisal(
    input: &DevelopmentInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<DevelopmentMetrics> {
    trace!("derive_development_appraisal: {input:?}");
    let mut warnings: Vec<String> = Vec::new();

    let years = Decimal::from(input.build_period_months) / dec!(12);
    let finance_factor = input.finance_rate * years;

    let costs = development_costs(input, finance_factor, tables);

    let profit = input.gdv - costs.total_development_cost;
    let profit_on_cost = safe_div(profit, costs.total_development_cost);
    let profit_on_gdv = safe_div(profit, input.gdv);
    let target_profit = input.gdv * input.target_profit_pct;

    // Everything except land, its acquisition costs and its finance
    let non_land_cost = costs.total_development_cost
        - costs.land_price
        - costs.acquisition_costs
        - costs.land_finance;
    let land_cost_factor =
        (Decimal::ONE + input.acquisition_costs_pct) * (Decimal::ONE + finance_factor);
    let residual_land_value = safe_div(input.gdv - target_profit - non_land_cost, land_cost_factor);

    let viable = profit >= target_profit && profit > Decimal::ZERO;

    if input.build_period_months == 0 && !input.finance_rate.is_zero() {
        warnings.push("Build period is zero — no finance cost accrued".into());
    }
    if residual_land_value < Decimal::ZERO {
        warnings.push("Negative residual land value — scheme cannot support any land cost".into());
    } else if input.land_price > residual_land_value {
        warnings.push(format!(
            "Land price exceeds the residual land value by {}",
            format::gbp_whole(input.land_price - residual_land_value)
        ));
    }

    let output = DevelopmentMetrics {
        region: normalize_key(&input.region),
        gdv: input.gdv,
        gdv_per_sqm: safe_div(input.gdv, input.gross_internal_area_sqm),
        cost_per_sqm: safe_div(costs.total_development_cost, input.gross_internal_area_sqm),
        costs,
        profit,
        profit_on_cost,
        profit_on_gdv,
        target_profit,
        residual_land_value,
        viable,
    };

    with_metadata(
        "Residual Development Appraisal (profit on GDV target)",
        input,
        warnings,
        tables.version(),
        output,
    )
}

fn development_costs(
    input: &DevelopmentInput,
    finance_factor: Decimal,
    tables: &dyn RateTableProvider,
) -> DevelopmentCosts {
    let acquisition_costs = input.land_price * input.acquisition_costs_pct;

    let regional_multiplier = tables.regional_multiplier(&input.region);
    let build_cost = input.gross_internal_area_sqm * input.build_cost_per_sqm * regional_multiplier;
    let professional_fees = build_cost * input.professional_fees_pct;
    let contingency = build_cost * input.contingency_pct;

    let land_finance = (input.land_price + acquisition_costs) * finance_factor;
    let build_finance =
        (build_cost + professional_fees + contingency) * BUILD_DRAWDOWN_FACTOR * finance_factor;
    let finance_cost = land_finance + build_finance;

    let sales_costs = input.gdv * input.sales_costs_pct;

    let total_development_cost = input.land_price
        + acquisition_costs
        + build_cost
        + professional_fees
        + contingency
        + input.cil_liability
        + finance_cost
        + sales_costs;

    DevelopmentCosts {
        land_price: input.land_price,
        acquisition_costs,
        regional_multiplier,
        build_cost,
        professional_fees,
        contingency,
        cil_liability: input.cil_liability,
        land_finance,
        build_finance,
        finance_cost,
        sales_costs,
        total_development_cost,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RateTables;

    fn sample_input() -> DevelopmentInput {
        DevelopmentInput {
            gdv: dec!(2600000),
            land_price: dec!(600000),
            acquisition_costs_pct: dec!(0.05),
            gross_internal_area_sqm: dec!(800),
            build_cost_per_sqm: dec!(1500),
            region: "other".into(),
            professional_fees_pct: dec!(0.10),
            contingency_pct: dec!(0.05),
            finance_rate: dec!(0.08),
            build_period_months: 12,
            sales_costs_pct: dec!(0.02),
            cil_liability: dec!(50000),
            target_profit_pct: dec!(0.20),
        }
    }

    #[test]
    fn test_cost_stack() {
        let tables = RateTables::default();
        let out = derive_development_appraisal(&sample_input(), &tables).result;
        let c = &out.costs;
        assert_eq!(c.acquisition_costs, dec!(30000));
        assert_eq!(c.build_cost, dec!(1200000));
        assert_eq!(c.professional_fees, dec!(120000));
        assert_eq!(c.contingency, dec!(60000));
        // 630000 * 8%
        assert_eq!(c.land_finance, dec!(50400));
        // 1380000 * 0.5 * 8%
        assert_eq!(c.build_finance, dec!(55200));
        assert_eq!(c.sales_costs, dec!(52000));
        assert_eq!(c.total_development_cost, dec!(2217600));
    }

    #[test]
    fn test_profit_and_viability() {
        let tables = RateTables::default();
        let out = derive_development_appraisal(&sample_input(), &tables);
        assert_eq!(out.result.profit, dec!(382400));
        assert_eq!(out.result.target_profit, dec!(520000));
        assert!(!out.result.viable);
        assert!(out.warnings.iter().any(|w| w.contains("residual land value")));
    }

    #[test]
    fn test_residual_land_value_hits_target() {
        let tables = RateTables::default();
        let first = derive_development_appraisal(&sample_input(), &tables).result;
        let mut input = sample_input();
        input.land_price = first.residual_land_value;
        let second = derive_development_appraisal(&input, &tables).result;
        assert!((second.profit - second.target_profit).abs() < dec!(0.01));
        // residual is independent of the land price entered
        assert!((second.residual_land_value - first.residual_land_value).abs() < dec!(0.01));
    }

    #[test]
    fn test_zero_input_is_total() {
        let tables = RateTables::default();
        let out = derive_development_appraisal(&DevelopmentInput::default(), &tables).result;
        assert_eq!(out.profit_on_cost, Decimal::ZERO);
        assert_eq!(out.profit_on_gdv, Decimal::ZERO);
        assert_eq!(out.gdv_per_sqm, Decimal::ZERO);
        assert!(!out.viable);
    }
}
