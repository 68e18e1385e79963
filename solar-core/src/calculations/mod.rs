//! Calculation logic for the savings calculator and the solar potential map.
//!
//! Everything in here is pure: no I/O, no shared state, and identical inputs
//! always produce identical outputs.

pub mod common;
pub mod estimator;
pub mod irradiance;
pub mod subsidy;

pub use estimator::{
    EstimateError, EstimateSummary, EstimatorConfig, EstimatorConfigError, SavingsEstimator,
};
pub use irradiance::{IrradianceBand, MapSummary, MapViewMode};
pub use subsidy::{SubsidyPolicy, SubsidyPolicyError};
