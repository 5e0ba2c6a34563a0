//! Built-in 2025/26 tables. Illustrative benchmarks, not live market data.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::{
    IcrParameters, InstalmentPolicy, LoftConversionCost, PropertyTaxParameters, RateTables,
    StampDutyTables,
};
use crate::schedule::{Band, Schedule};
use crate::types::Rate;

pub const DEFAULT_TABLES_VERSION: &str = "2025-26";

impl Default for RateTables {
    fn default() -> Self {
        RateTables {
            version: DEFAULT_TABLES_VERSION.to_string(),
            btl_rate_bands: rate_schedule(&[
                (dec!(0), Some(dec!(0.60)), dec!(0.0429)),
                (dec!(0.60), Some(dec!(0.75)), dec!(0.0479)),
                (dec!(0.75), Some(dec!(0.80)), dec!(0.0549)),
                (dec!(0.80), Some(dec!(0.85)), dec!(0.0599)),
                (dec!(0.85), None, dec!(0.0699)),
            ]),
            bridging_rate_bands: rate_schedule(&[
                (dec!(0), Some(dec!(0.50)), dec!(0.0075)),
                (dec!(0.50), Some(dec!(0.60)), dec!(0.0085)),
                (dec!(0.60), Some(dec!(0.70)), dec!(0.0095)),
                (dec!(0.70), Some(dec!(0.75)), dec!(0.0110)),
                (dec!(0.75), None, dec!(0.0125)),
            ]),
            icr: IcrParameters {
                stress_rate: dec!(0.055),
                basic_rate_threshold: dec!(1.25),
                higher_rate_threshold: dec!(1.45),
            },
            cil_rates: cil_rates(),
            cil_indices: [
                (2012, dec!(223)),
                (2013, dec!(224)),
                (2014, dec!(238)),
                (2015, dec!(256)),
                (2016, dec!(279)),
                (2017, dec!(286)),
                (2018, dec!(310)),
                (2019, dec!(329)),
                (2020, dec!(334)),
                (2021, dec!(333)),
                (2022, dec!(355)),
                (2023, dec!(381)),
                (2024, dec!(376)),
                (2025, dec!(384)),
            ]
            .into_iter()
            .collect(),
            // liabilities are whole pence, so 9999.99 is the last "under 10k" amount
            cil_instalments: Schedule::from_validated(vec![
                Band::new(
                    dec!(0),
                    Some(dec!(9999.99)),
                    InstalmentPolicy {
                        label: "single payment on commencement".into(),
                        offsets_days: vec![0],
                    },
                ),
                Band::new(
                    dec!(9999.99),
                    Some(dec!(500000)),
                    InstalmentPolicy {
                        label: "two instalments".into(),
                        offsets_days: vec![0, 180],
                    },
                ),
                Band::new(
                    dec!(500000),
                    None,
                    InstalmentPolicy {
                        label: "four instalments".into(),
                        offsets_days: vec![0, 90, 180, 270],
                    },
                ),
            ]),
            regional_multipliers: keyed(&[
                ("london", dec!(1.20)),
                ("south_east", dec!(1.08)),
                ("east_of_england", dec!(1.03)),
                ("south_west", dec!(1.00)),
                ("east_midlands", dec!(0.97)),
                ("west_midlands", dec!(0.96)),
                ("north_west", dec!(0.95)),
                ("yorkshire_and_humber", dec!(0.94)),
                ("north_east", dec!(0.92)),
                ("wales", dec!(0.95)),
                ("scotland", dec!(0.98)),
                ("northern_ireland", dec!(0.85)),
                ("other", dec!(1.00)),
            ]),
            loft_conversions: [
                ("velux", dec!(1100), dec!(0.10)),
                ("dormer", dec!(1550), dec!(0.15)),
                ("hip_to_gable", dec!(1800), dec!(0.18)),
                ("mansard", dec!(2100), dec!(0.20)),
                ("other", dec!(1550), dec!(0.15)),
            ]
            .into_iter()
            .map(|(k, cost, uplift)| {
                (
                    k.to_string(),
                    LoftConversionCost {
                        cost_per_sqm: cost,
                        value_uplift: uplift,
                    },
                )
            })
            .collect(),
            tax_brackets: keyed(&[
                ("basic", dec!(0.20)),
                ("higher", dec!(0.40)),
                ("additional", dec!(0.45)),
            ]),
            income_tax_bands: rate_schedule(&[
                (dec!(0), Some(dec!(12570)), dec!(0)),
                (dec!(12570), Some(dec!(50270)), dec!(0.20)),
                (dec!(50270), Some(dec!(125140)), dec!(0.40)),
                (dec!(125140), None, dec!(0.45)),
            ]),
            property_tax: PropertyTaxParameters {
                fhl_min_days_available: 210,
                fhl_min_days_let: 105,
                class4_threshold: dec!(12570),
                class4_rate: dec!(0.06),
                finance_cost_credit_rate: dec!(0.20),
            },
            stamp_duty: StampDutyTables {
                standard: rate_schedule(&[
                    (dec!(0), Some(dec!(125000)), dec!(0)),
                    (dec!(125000), Some(dec!(250000)), dec!(0.02)),
                    (dec!(250000), Some(dec!(925000)), dec!(0.05)),
                    (dec!(925000), Some(dec!(1500000)), dec!(0.10)),
                    (dec!(1500000), None, dec!(0.12)),
                ]),
                first_time_buyer: rate_schedule(&[
                    (dec!(0), Some(dec!(300000)), dec!(0)),
                    (dec!(300000), None, dec!(0.05)),
                ]),
                first_time_buyer_max_price: dec!(500000),
                additional_dwelling_surcharge: dec!(0.05),
                non_resident_surcharge: dec!(0.02),
            },
        }
    }
}

fn rate_schedule(rows: &[(Decimal, Option<Decimal>, Rate)]) -> Schedule<Rate> {
    Schedule::from_validated(
        rows.iter()
            .map(|(lower, upper, rate)| Band::new(*lower, *upper, *rate))
            .collect(),
    )
}

fn keyed(rows: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
    rows.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn cil_rates() -> BTreeMap<String, BTreeMap<String, Decimal>> {
    [
        (
            "camden",
            &[
                ("zone_a", dec!(500)),
                ("zone_b", dec!(250)),
                ("zone_c", dec!(150)),
                ("other", dec!(150)),
            ][..],
        ),
        ("islington", &[("zone_a", dec!(250)), ("other", dec!(250))][..]),
        (
            "tower_hamlets",
            &[
                ("zone_1", dec!(280)),
                ("zone_2", dec!(200)),
                ("zone_3", dec!(65)),
                ("other", dec!(65)),
            ][..],
        ),
        (
            "southwark",
            &[
                ("zone_1", dec!(400)),
                ("zone_2", dec!(200)),
                ("zone_3", dec!(50)),
                ("other", dec!(50)),
            ][..],
        ),
        (
            "bristol",
            &[("zone_a", dec!(70)), ("zone_b", dec!(50)), ("other", dec!(50))][..],
        ),
        ("other", &[("other", dec!(100))][..]),
    ]
    .into_iter()
    .map(|(authority, zones)| (authority.to_string(), keyed(zones)))
    .collect()
}
