use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::parse::lenient;
use crate::ratios::safe_div;
use crate::tables::{normalize_key, RateTableProvider};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoftConversionInput {
    /// Current market value before conversion
    #[serde(default, with = "lenient::money")]
    pub property_value: Money,
    /// New habitable floor area
    #[serde(default, with = "lenient::money")]
    pub floor_area_sqm: Money,
    /// velux, dormer, hip_to_gable or mansard
    #[serde(default)]
    pub conversion_type: String,
    #[serde(default)]
    pub region: String,
    /// Architect, structural engineer and building control
    #[serde(default, with = "lenient::percent")]
    pub professional_fees_pct: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoftConversionMetrics {
    pub conversion_type: String,
    pub region: String,
    pub base_cost_per_sqm: Money,
    pub regional_multiplier: Decimal,
    pub cost_per_sqm: Money,
    pub build_cost: Money,
    pub professional_fees: Money,
    pub total_cost: Money,
    pub value_uplift_pct: Rate,
    pub value_added: Money,
    pub post_conversion_value: Money,
    /// value added - total cost
    pub net_gain: Money,
    /// net gain / total cost
    pub roi: Rate,
    pub value_added_per_sqm: Money,
    /// Uplift on current value needed to recover the total cost
    pub break_even_uplift: Rate,
}

/// Cost, value uplift and ROI of a loft conversion.
pub fn derive_loft_conversion(
    input: &LoftConversionInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<LoftConversionMetrics> {
    trace!("derive_loft_conversion: {input:?}");
    let mut warnings: Vec<String> = Vec::new();

    let kind = tables.loft_conversion(&input.conversion_type);
    let regional_multiplier = tables.regional_multiplier(&input.region);
    let cost_per_sqm = kind.cost_per_sqm * regional_multiplier;

    let build_cost = input.floor_area_sqm * cost_per_sqm;
    let professional_fees = build_cost * input.professional_fees_pct;
    let total_cost = build_cost + professional_fees;

    let value_added = input.property_value * kind.value_uplift;
    let net_gain = value_added - total_cost;
    let roi = safe_div(net_gain, total_cost);

    if net_gain < Decimal::ZERO {
        warnings.push("Conversion cost exceeds the expected value uplift".into());
    }

    let output = LoftConversionMetrics {
        conversion_type: normalize_key(&input.conversion_type),
        region: normalize_key(&input.region),
        base_cost_per_sqm: kind.cost_per_sqm,
        regional_multiplier,
        cost_per_sqm,
        build_cost,
        professional_fees,
        total_cost,
        value_uplift_pct: kind.value_uplift,
        value_added,
        post_conversion_value: input.property_value + value_added,
        net_gain,
        roi,
        value_added_per_sqm: safe_div(value_added, input.floor_area_sqm),
        break_even_uplift: safe_div(total_cost, input.property_value),
    };

    with_metadata(
        "Loft Conversion ROI (regional build cost vs typical uplift)",
        input,
        warnings,
        tables.version(),
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RateTables;
    use rust_decimal_macros::dec;

    fn sample_input() -> LoftConversionInput {
        LoftConversionInput {
            property_value: dec!(500000),
            floor_area_sqm: dec!(30),
            conversion_type: "Dormer".into(),
            region: "other".into(),
            professional_fees_pct: dec!(0.10),
        }
    }

    #[test]
    fn test_dormer_roi() {
        let tables = RateTables::default();
        let out = derive_loft_conversion(&sample_input(), &tables).result;
        // 30 * 1550 = 46500; fees 4650
        assert_eq!(out.build_cost, dec!(46500));
        assert_eq!(out.total_cost, dec!(51150));
        // 500000 * 15%
        assert_eq!(out.value_added, dec!(75000));
        assert_eq!(out.net_gain, dec!(23850));
        assert_eq!(out.post_conversion_value, dec!(575000));
        assert!(out.roi > dec!(0.46) && out.roi < dec!(0.47));
    }

    #[test]
    fn test_london_multiplier_raises_cost() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.region = "London".into();
        let out = derive_loft_conversion(&input, &tables).result;
        assert_eq!(out.regional_multiplier, dec!(1.20));
        assert_eq!(out.cost_per_sqm, dec!(1860));
    }

    #[test]
    fn test_unknown_kind_uses_fallback() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.conversion_type = "treehouse".into();
        let out = derive_loft_conversion(&input, &tables).result;
        assert_eq!(out.base_cost_per_sqm, dec!(1550));
    }

    #[test]
    fn test_zero_input_is_total() {
        let tables = RateTables::default();
        let out = derive_loft_conversion(&LoftConversionInput::default(), &tables).result;
        assert_eq!(out.roi, Decimal::ZERO);
        assert_eq!(out.value_added_per_sqm, Decimal::ZERO);
        assert_eq!(out.break_even_uplift, Decimal::ZERO);
    }

    #[test]
    fn test_loss_making_conversion_warns() {
        let tables = RateTables::default();
        let mut input = sample_input();
        input.property_value = dec!(200000);
        let out = derive_loft_conversion(&input, &tables);
        assert!(out.result.net_gain < Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }
}
