use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format;
use crate::parse::lenient;
use crate::ratios::safe_div;
use crate::schedule::BandSlice;
use crate::tables::RateTableProvider;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StampDutyInput {
    #[serde(default, with = "lenient::money")]
    pub price: Money,
    #[serde(default)]
    pub first_time_buyer: bool,
    /// Buyer will own more than one dwelling after completion
    #[serde(default)]
    pub additional_dwelling: bool,
    #[serde(default)]
    pub non_resident: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SdltSchedule {
    Standard,
    FirstTimeBuyer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampDutyMetrics {
    pub price: Money,
    pub schedule: SdltSchedule,
    /// Added to every band's rate
    pub surcharge_rate: Rate,
    pub bands: Vec<BandSlice>,
    /// Sum of the band charges
    pub total: Money,
    pub effective_rate: Rate,
}

/// Residential SDLT by marginal band, with relief and surcharges.
pub fn derive_stamp_duty(
    input: &StampDutyInput,
    tables: &dyn RateTableProvider,
) -> ComputationOutput<StampDutyMetrics> {
    trace!("derive_stamp_duty: {input:?}");
    let mut warnings: Vec<String> = Vec::new();
    let sdlt = tables.stamp_duty();

    let schedule = if input.first_time_buyer && input.additional_dwelling {
        warnings.push("First-time buyer relief does not apply to additional dwellings".into());
        SdltSchedule::Standard
    } else if input.first_time_buyer && input.price > sdlt.first_time_buyer_max_price {
        warnings.push(format!(
            "First-time buyer relief lost above {}",
            format::gbp_whole(sdlt.first_time_buyer_max_price)
        ));
        SdltSchedule::Standard
    } else if input.first_time_buyer {
        SdltSchedule::FirstTimeBuyer
    } else {
        SdltSchedule::Standard
    };

    let mut surcharge_rate = Decimal::ZERO;
    if input.additional_dwelling {
        surcharge_rate += sdlt.additional_dwelling_surcharge;
    }
    if input.non_resident {
        surcharge_rate += sdlt.non_resident_surcharge;
    }

    let bands = match schedule {
        SdltSchedule::Standard => &sdlt.standard,
        SdltSchedule::FirstTimeBuyer => &sdlt.first_time_buyer,
    }
    .slices_with_surcharge(input.price, surcharge_rate);
    let total: Money = bands.iter().map(|b| b.charge).sum();

    let output = StampDutyMetrics {
        price: input.price,
        schedule,
        surcharge_rate,
        bands,
        total,
        effective_rate: safe_div(total, input.price),
    };

    with_metadata(
        "SDLT (residential, marginal bands)",
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

    fn buy(price: Money) -> StampDutyInput {
        StampDutyInput {
            price,
            ..Default::default()
        }
    }

    #[test]
    fn test_standard_purchase() {
        let tables = RateTables::default();
        let out = derive_stamp_duty(&buy(dec!(300000)), &tables).result;
        // 125k @ 0 + 125k @ 2% + 50k @ 5%
        assert_eq!(out.total, dec!(5000));
        assert_eq!(out.effective_rate, dec!(5000) / dec!(300000));
    }

    #[test]
    fn test_first_time_buyer_relief() {
        let tables = RateTables::default();
        let mut input = buy(dec!(400000));
        input.first_time_buyer = true;
        let out = derive_stamp_duty(&input, &tables).result;
        assert_eq!(out.schedule, SdltSchedule::FirstTimeBuyer);
        // 100k @ 5%
        assert_eq!(out.total, dec!(5000));
    }

    #[test]
    fn test_relief_lost_above_cap() {
        let tables = RateTables::default();
        let mut input = buy(dec!(550000));
        input.first_time_buyer = true;
        let out = derive_stamp_duty(&input, &tables);
        assert_eq!(out.result.schedule, SdltSchedule::Standard);
        assert_eq!(out.warnings, vec!["First-time buyer relief lost above £500,000".to_string()]);
    }

    #[test]
    fn test_surcharges_apply_to_every_band() {
        let tables = RateTables::default();
        let mut input = buy(dec!(300000));
        input.additional_dwelling = true;
        input.non_resident = true;
        let out = derive_stamp_duty(&input, &tables).result;
        assert_eq!(out.surcharge_rate, dec!(0.07));
        // 5000 + 300000 * 7%
        assert_eq!(out.total, dec!(26000));
        assert_eq!(out.bands[0].rate, dec!(0.07));
    }

    #[test]
    fn test_slices_sum_to_price() {
        let tables = RateTables::default();
        let out = derive_stamp_duty(&buy(dec!(2000000)), &tables).result;
        let taxed: Money = out.bands.iter().map(|b| b.taxable).sum();
        assert_eq!(taxed, dec!(2000000));
    }
}
