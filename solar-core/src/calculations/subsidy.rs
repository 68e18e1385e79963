//! Subsidy cap strategies.
//!
//! Two formulas are in circulation for the government subsidy: the regional
//! ceiling on its own, and the ceiling further limited to a fraction of the
//! system cost. Both are offered so either can be selected and tested.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RegionTariff;
use crate::calculations::common::min;

/// 0.40
const FORTY_PERCENT: Decimal = Decimal::from_parts(40, 0, 0, false, 2);

/// How the subsidy for a system is capped.
///
/// Whatever the policy, the subsidy never exceeds the gross system cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubsidyPolicy {
    /// The regional ceiling is granted outright.
    FlatCeiling,
    /// The smaller of the regional ceiling and `max_fraction` of the gross
    /// system cost.
    CeilingAndCostFraction { max_fraction: Decimal },
}

impl Default for SubsidyPolicy {
    fn default() -> Self {
        Self::CeilingAndCostFraction {
            max_fraction: FORTY_PERCENT,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubsidyPolicyError {
    #[error("unknown subsidy policy '{0}' (expected 'flat' or 'capped[:fraction]')")]
    UnknownPolicy(String),

    #[error("subsidy fraction must be between 0 and 1, got '{0}'")]
    InvalidFraction(String),
}

impl SubsidyPolicy {
    /// Subsidy granted for a system of `gross_system_cost` in `tariff`'s region.
    pub fn apply(
        &self,
        tariff: &RegionTariff,
        gross_system_cost: Decimal,
    ) -> Decimal {
        let ceiling = tariff.base_subsidy_ceiling;
        let capped = match self {
            Self::FlatCeiling => ceiling,
            Self::CeilingAndCostFraction { max_fraction } => {
                min(ceiling, gross_system_cost * *max_fraction)
            }
        };
        min(capped, gross_system_cost.max(Decimal::ZERO))
    }

    /// Returns an error if a configured fraction is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), SubsidyPolicyError> {
        match self {
            Self::FlatCeiling => Ok(()),
            Self::CeilingAndCostFraction { max_fraction } => {
                if *max_fraction < Decimal::ZERO || *max_fraction > Decimal::ONE {
                    Err(SubsidyPolicyError::InvalidFraction(max_fraction.to_string()))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Parses `flat`, `capped`, or `capped:<fraction>` (e.g. `capped:0.3`).
impl FromStr for SubsidyPolicy {
    type Err = SubsidyPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.split_once(':') {
            None if normalized == "flat" => Ok(Self::FlatCeiling),
            None if normalized == "capped" => Ok(Self::default()),
            Some(("capped", fraction)) => {
                let max_fraction = Decimal::from_str(fraction.trim())
                    .map_err(|_| SubsidyPolicyError::InvalidFraction(fraction.to_string()))?;
                let policy = Self::CeilingAndCostFraction { max_fraction };
                policy.validate()?;
                Ok(policy)
            }
            _ => Err(SubsidyPolicyError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for SubsidyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlatCeiling => write!(f, "flat"),
            Self::CeilingAndCostFraction { max_fraction } => write!(f, "capped:{max_fraction}"),
        }
    }
}
