mod admin;
mod city_irradiance;
mod contact_submission;
mod estimate;
mod region_tariff;

pub use admin::{AdminIdentity, AdminSession, LoginCredentials, SessionCredential};
pub use city_irradiance::CityIrradiance;
pub use contact_submission::{ContactSubmission, NewContactSubmission};
pub use estimate::{EstimateInput, EstimateResult};
pub use region_tariff::{RegionTariff, RegionTariffTable, TariffTableError};
