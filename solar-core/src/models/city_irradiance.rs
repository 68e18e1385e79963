use serde::{Deserialize, Serialize};

/// Solar irradiance record for one city on the potential map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityIrradiance {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Average daily irradiance in kWh/m²/day.
    pub irradiance: f64,
    /// Marketing label shown in the popup ("Excellent", "High", ...).
    pub potential: String,
    /// Typical bill reduction, in percent.
    pub savings_pct: u32,
    pub installations: u32,
    pub description: String,
}
