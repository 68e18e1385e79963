use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid price and subsidy ceiling for one administrative region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTariff {
    pub region_id: String,
    pub display_name: String,
    /// Currency per kWh of grid electricity.
    pub unit_rate: Decimal,
    /// Maximum government subsidy nominally available, in currency.
    pub base_subsidy_ceiling: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TariffTableError {
    #[error("tariff table is empty")]
    Empty,

    #[error("duplicate region id '{0}'")]
    DuplicateRegion(String),

    #[error("unit rate for region '{region_id}' must be positive, got {unit_rate}")]
    NonPositiveUnitRate { region_id: String, unit_rate: Decimal },

    #[error("subsidy ceiling for region '{region_id}' must not be negative, got {ceiling}")]
    NegativeSubsidyCeiling { region_id: String, ceiling: Decimal },
}

/// Immutable, ordered set of [`RegionTariff`] entries.
///
/// The table is validated once on construction and never mutated afterwards;
/// entries keep the order they were supplied in so front ends can list them
/// the way the source data does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTariffTable {
    tariffs: Vec<RegionTariff>,
}

impl RegionTariffTable {
    pub fn new(tariffs: Vec<RegionTariff>) -> Result<Self, TariffTableError> {
        if tariffs.is_empty() {
            return Err(TariffTableError::Empty);
        }

        for (idx, tariff) in tariffs.iter().enumerate() {
            if tariff.unit_rate <= Decimal::ZERO {
                return Err(TariffTableError::NonPositiveUnitRate {
                    region_id: tariff.region_id.clone(),
                    unit_rate: tariff.unit_rate,
                });
            }
            if tariff.base_subsidy_ceiling < Decimal::ZERO {
                return Err(TariffTableError::NegativeSubsidyCeiling {
                    region_id: tariff.region_id.clone(),
                    ceiling: tariff.base_subsidy_ceiling,
                });
            }
            if tariffs[..idx]
                .iter()
                .any(|earlier| earlier.region_id == tariff.region_id)
            {
                return Err(TariffTableError::DuplicateRegion(tariff.region_id.clone()));
            }
        }

        Ok(Self { tariffs })
    }

    pub fn get(&self, region_id: &str) -> Option<&RegionTariff> {
        self.tariffs.iter().find(|t| t.region_id == region_id)
    }

    pub fn contains(&self, region_id: &str) -> bool {
        self.get(region_id).is_some()
    }

    /// Region ids in table order.
    pub fn region_ids(&self) -> Vec<&str> {
        self.tariffs.iter().map(|t| t.region_id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionTariff> {
        self.tariffs.iter()
    }

    pub fn len(&self) -> usize {
        self.tariffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tariffs.is_empty()
    }
}
