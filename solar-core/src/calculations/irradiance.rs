//! Colour bands, marker sizing and legend figures for the solar potential map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CityIrradiance;

/// Irradiance classification used to colour map markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IrradianceBand {
    Low,
    Medium,
    High,
    VeryHigh,
    Excellent,
}

impl IrradianceBand {
    /// Classifies a daily irradiance in kWh/m²/day.
    pub fn classify(irradiance: f64) -> Self {
        if irradiance >= 6.0 {
            Self::Excellent
        } else if irradiance >= 5.5 {
            Self::VeryHigh
        } else if irradiance >= 5.0 {
            Self::High
        } else if irradiance >= 4.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Hex colour used for markers in this band.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Excellent => "#16a34a",
            Self::VeryHigh => "#22c55e",
            Self::High => "#eab308",
            Self::Medium => "#f97316",
            Self::Low => "#dc2626",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Which figure sizes the map markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapViewMode {
    #[default]
    Irradiance,
    Savings,
    Installations,
}

impl MapViewMode {
    pub fn all() -> &'static [MapViewMode] {
        &[Self::Irradiance, Self::Savings, Self::Installations]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Irradiance => "irradiance",
            Self::Savings => "savings",
            Self::Installations => "installations",
        }
    }

    /// The figure this mode reads from a city record.
    pub fn value_of(&self, city: &CityIrradiance) -> f64 {
        match self {
            Self::Irradiance => city.irradiance,
            Self::Savings => f64::from(city.savings_pct),
            Self::Installations => f64::from(city.installations),
        }
    }

    /// Marker radius in pixels for `value`, clamped per mode.
    pub fn marker_radius(&self, value: f64) -> f64 {
        match self {
            Self::Irradiance => (value * 4.0).clamp(8.0, 25.0),
            Self::Savings => (value / 5.0).clamp(6.0, 20.0),
            Self::Installations => (value / 200.0).clamp(5.0, 18.0),
        }
    }
}

impl fmt::Display for MapViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown map view mode '{s}'"))
    }
}

/// Legend figures for a set of cities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSummary {
    pub city_count: usize,
    pub average_irradiance: f64,
    pub total_installations: u64,
    pub best_city: Option<String>,
}

impl MapSummary {
    pub fn from_cities(cities: &[CityIrradiance]) -> Self {
        let city_count = cities.len();
        let average_irradiance = if city_count == 0 {
            0.0
        } else {
            cities.iter().map(|c| c.irradiance).sum::<f64>() / city_count as f64
        };
        let total_installations = cities.iter().map(|c| u64::from(c.installations)).sum();
        let best_city = cities
            .iter()
            .max_by(|a, b| a.irradiance.total_cmp(&b.irradiance))
            .map(|c| c.city.clone());

        Self {
            city_count,
            average_irradiance,
            total_installations,
            best_city,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn city(name: &str, irradiance: f64, installations: u32) -> CityIrradiance {
        CityIrradiance {
            city: name.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            irradiance,
            potential: String::new(),
            savings_pct: 80,
            installations,
            description: String::new(),
        }
    }

    #[test]
    fn classify_uses_inclusive_lower_bounds() {
        assert_eq!(IrradianceBand::classify(6.2), IrradianceBand::Excellent);
        assert_eq!(IrradianceBand::classify(6.0), IrradianceBand::Excellent);
        assert_eq!(IrradianceBand::classify(5.5), IrradianceBand::VeryHigh);
        assert_eq!(IrradianceBand::classify(5.3), IrradianceBand::High);
        assert_eq!(IrradianceBand::classify(4.9), IrradianceBand::Medium);
        assert_eq!(IrradianceBand::classify(4.4), IrradianceBand::Low);
    }

    #[test]
    fn bands_have_distinct_colors() {
        assert_eq!(IrradianceBand::Excellent.color(), "#16a34a");
        assert_eq!(IrradianceBand::Low.color(), "#dc2626");
        assert_ne!(IrradianceBand::High.color(), IrradianceBand::Medium.color());
    }

    #[test]
    fn marker_radius_is_clamped_per_mode() {
        assert_eq!(MapViewMode::Irradiance.marker_radius(1.0), 8.0);
        assert_eq!(MapViewMode::Irradiance.marker_radius(5.5), 22.0);
        assert_eq!(MapViewMode::Irradiance.marker_radius(7.0), 25.0);
        assert_eq!(MapViewMode::Savings.marker_radius(85.0), 17.0);
        assert_eq!(MapViewMode::Installations.marker_radius(800.0), 5.0);
        assert_eq!(MapViewMode::Installations.marker_radius(4200.0), 18.0);
    }

    #[test]
    fn view_mode_parses_case_insensitively() {
        assert_eq!("Savings".parse(), Ok(MapViewMode::Savings));
        assert!("heat".parse::<MapViewMode>().is_err());
    }

    #[test]
    fn summary_picks_sunniest_city() {
        let cities = vec![city("Patna", 5.0, 800), city("Jodhpur", 6.2, 1800)];

        let summary = MapSummary::from_cities(&cities);

        assert_eq!(summary.city_count, 2);
        assert_eq!(summary.total_installations, 2600);
        assert_eq!(summary.best_city.as_deref(), Some("Jodhpur"));
        assert!((summary.average_irradiance - 5.6).abs() < 1e-9);
    }

    #[test]
    fn summary_of_no_cities_is_empty() {
        let summary = MapSummary::from_cities(&[]);

        assert_eq!(summary.city_count, 0);
        assert_eq!(summary.best_city, None);
        assert_eq!(summary.average_irradiance, 0.0);
    }
}
