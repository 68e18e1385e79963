//! Checks the shipped reference tables against known values.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use solar_core::calculations::{IrradianceBand, MapSummary};
use solar_core::{EstimateInput, EstimatorConfig, SavingsEstimator};
use solar_data::ReferenceData;

fn builtin() -> ReferenceData {
    ReferenceData::builtin().expect("Built-in tables should load")
}

#[test]
fn test_region_order_matches_source_file() {
    let data = builtin();

    assert_eq!(
        data.tariffs.region_ids(),
        vec!["maharashtra", "delhi", "karnataka", "tamilnadu", "gujarat", "rajasthan"]
    );
}

#[test]
fn test_tariff_values() {
    let data = builtin();

    let expected = [
        ("maharashtra", "Maharashtra", dec!(8.5), dec!(40000)),
        ("delhi", "Delhi", dec!(7.0), dec!(30000)),
        ("karnataka", "Karnataka", dec!(7.5), dec!(35000)),
        ("tamilnadu", "Tamil Nadu", dec!(6.5), dec!(25000)),
        ("gujarat", "Gujarat", dec!(8.0), dec!(40000)),
        ("rajasthan", "Rajasthan", dec!(9.0), dec!(45000)),
    ];

    for (id, name, rate, ceiling) in expected {
        let tariff = data.tariffs.get(id).expect("region should exist");
        assert_eq!(tariff.display_name, name);
        assert_eq!(tariff.unit_rate, rate, "unit rate for {id}");
        assert_eq!(tariff.base_subsidy_ceiling, ceiling, "ceiling for {id}");
    }
}

#[test]
fn test_worked_example_against_builtin_tariffs() {
    let data = builtin();
    let estimator = SavingsEstimator::new(&data.tariffs, EstimatorConfig::default());

    let result = estimator
        .compute_estimate(&EstimateInput::new(dec!(5000), dec!(1000), "maharashtra"))
        .expect("estimate should compute");

    assert_eq!(result.monthly_savings, dec!(4000));
    assert_eq!(result.annual_savings, dec!(48000));
    assert_eq!(result.subsidy_amount, dec!(40000));
}

#[test]
fn test_city_bands() {
    let data = builtin();
    let band_of = |name: &str| {
        let city = data
            .cities
            .iter()
            .find(|c| c.city == name)
            .expect("city should exist");
        IrradianceBand::classify(city.irradiance)
    };

    assert_eq!(band_of("Jodhpur"), IrradianceBand::Excellent);
    assert_eq!(band_of("Mumbai"), IrradianceBand::VeryHigh);
    assert_eq!(band_of("Delhi"), IrradianceBand::High);
    assert_eq!(band_of("Kolkata"), IrradianceBand::Medium);
}

#[test]
fn test_map_summary_over_builtin_cities() {
    let data = builtin();

    let summary = MapSummary::from_cities(&data.cities);

    assert_eq!(summary.city_count, 15);
    assert_eq!(summary.total_installations, 31_500);
    assert_eq!(summary.best_city.as_deref(), Some("Jodhpur"));
}
