use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use solar_core::{CityIrradiance, RegionTariff, RegionTariffTable, TariffTableError};
use thiserror::Error;
use tracing::debug;

const BUILTIN_TARIFFS: &str = include_str!("../data/region_tariffs.csv");
const BUILTIN_CITIES: &str = include_str!("../data/cities.csv");

/// Errors that can occur when loading reference tables.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid city record '{city}': {reason}")]
    InvalidCity { city: String, reason: String },

    #[error("Invalid tariff table: {0}")]
    Table(#[from] TariffTableError),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the region tariffs CSV file.
///
/// - `region_id`: lowercase key used by the estimator (e.g. `maharashtra`)
/// - `display_name`: human-readable region name
/// - `unit_rate`: grid price per kWh
/// - `subsidy_ceiling`: maximum subsidy in currency units
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TariffRecord {
    pub region_id: String,
    pub display_name: String,
    pub unit_rate: Decimal,
    pub subsidy_ceiling: Decimal,
}

impl From<TariffRecord> for RegionTariff {
    fn from(record: TariffRecord) -> Self {
        RegionTariff {
            region_id: record.region_id.trim().to_lowercase(),
            display_name: record.display_name.trim().to_string(),
            unit_rate: record.unit_rate,
            base_subsidy_ceiling: record.subsidy_ceiling,
        }
    }
}

/// Loader for the region tariff table.
pub struct TariffLoader;

impl TariffLoader {
    /// Parse tariff records from any reader (a file or a string slice).
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TariffRecord>, LoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TariffRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse and validate into a [`RegionTariffTable`], keeping file order.
    pub fn load<R: Read>(reader: R) -> Result<RegionTariffTable, LoaderError> {
        let records = Self::parse(reader)?;
        let table = RegionTariffTable::new(records.into_iter().map(RegionTariff::from).collect())?;
        Ok(table)
    }
}

/// A single record from the city irradiance CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CityRecord {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub irradiance: f64,
    pub potential: String,
    pub savings_pct: u32,
    pub installations: u32,
    pub description: String,
}

impl CityRecord {
    fn into_city(self) -> Result<CityIrradiance, LoaderError> {
        let invalid = |reason: &str| LoaderError::InvalidCity {
            city: self.city.clone(),
            reason: reason.to_string(),
        };

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid("latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid("longitude out of range"));
        }
        if !self.irradiance.is_finite() || self.irradiance <= 0.0 {
            return Err(invalid("irradiance must be positive"));
        }
        if self.savings_pct > 100 {
            return Err(invalid("savings percentage above 100"));
        }

        Ok(CityIrradiance {
            city: self.city,
            latitude: self.latitude,
            longitude: self.longitude,
            irradiance: self.irradiance,
            potential: self.potential,
            savings_pct: self.savings_pct,
            installations: self.installations,
            description: self.description,
        })
    }
}

/// Loader for the city irradiance list.
pub struct CityLoader;

impl CityLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<CityRecord>, LoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: CityRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse and range-check every city.
    pub fn load<R: Read>(reader: R) -> Result<Vec<CityIrradiance>, LoaderError> {
        Self::parse(reader)?
            .into_iter()
            .map(CityRecord::into_city)
            .collect()
    }
}

/// Static tables the estimator and the map read at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    pub tariffs: RegionTariffTable,
    pub cities: Vec<CityIrradiance>,
}

impl ReferenceData {
    /// The tables compiled into the binary.
    pub fn builtin() -> Result<Self, LoaderError> {
        Ok(Self {
            tariffs: TariffLoader::load(BUILTIN_TARIFFS.as_bytes())?,
            cities: CityLoader::load(BUILTIN_CITIES.as_bytes())?,
        })
    }

    /// Built-in tables, with either one replaced by a CSV file on disk.
    pub fn load(
        tariffs_path: Option<&Path>,
        cities_path: Option<&Path>,
    ) -> Result<Self, LoaderError> {
        let tariffs = match tariffs_path {
            Some(path) => {
                debug!(path = %path.display(), "loading region tariffs from file");
                TariffLoader::load(open(path)?)?
            }
            None => TariffLoader::load(BUILTIN_TARIFFS.as_bytes())?,
        };
        let cities = match cities_path {
            Some(path) => {
                debug!(path = %path.display(), "loading city irradiance from file");
                CityLoader::load(open(path)?)?
            }
            None => CityLoader::load(BUILTIN_CITIES.as_bytes())?,
        };

        Ok(Self { tariffs, cities })
    }
}

fn open(path: &Path) -> Result<File, LoaderError> {
    File::open(path).map_err(|err| LoaderError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}
