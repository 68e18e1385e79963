//! Reference tables for the estimator and the solar potential map.
//!
//! The default tables ship inside the binary; either can be replaced by a
//! CSV file with the same columns.

mod loader;

pub use loader::{CityLoader, CityRecord, LoaderError, ReferenceData, TariffLoader, TariffRecord};
