//! Rooftop solar savings estimator.
//!
//! Turns a monthly electricity bill, the usable roof area and the customer's
//! region into a recommended system size, its cost after subsidy, and the
//! savings and environmental impact over the system's lifetime.
//!
//! # Calculation Steps
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Monthly units consumed (bill ÷ unit rate) |
//! | 2    | System size: smaller of consumption-based size and roof capacity |
//! | 3    | Gross system cost (size × cost per kW) |
//! | 4    | Subsidy (per [`SubsidyPolicy`]) |
//! | 5    | Net cost (gross − subsidy, minimum 0) |
//! | 6    | Monthly and annual savings (bill × offset fraction) |
//! | 7    | Payback period (net cost ÷ annual savings) |
//! | 8    | Lifetime savings, net lifetime savings, lifetime return % |
//! | 9    | CO₂ offset over the system lifetime |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use solar_core::calculations::{EstimatorConfig, SavingsEstimator};
//! use solar_core::{EstimateInput, RegionTariff, RegionTariffTable};
//!
//! let tariffs = RegionTariffTable::new(vec![RegionTariff {
//!     region_id: "maharashtra".to_string(),
//!     display_name: "Maharashtra".to_string(),
//!     unit_rate: dec!(8.5),
//!     base_subsidy_ceiling: dec!(40000),
//! }])
//! .unwrap();
//!
//! let estimator = SavingsEstimator::new(&tariffs, EstimatorConfig::default());
//! let input = EstimateInput::new(dec!(5000), dec!(1000), "maharashtra");
//! let result = estimator.compute_estimate(&input).unwrap();
//!
//! assert_eq!(result.monthly_savings, dec!(4000.0));
//! assert_eq!(result.annual_savings, dec!(48000.0));
//! assert!(result.recommended_system_size_kw < dec!(10));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{max, min, round_dp, round_whole};
use crate::calculations::subsidy::{SubsidyPolicy, SubsidyPolicyError};
use crate::{EstimateInput, EstimateResult, RegionTariff, RegionTariffTable};

/// Errors that can occur while producing an estimate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    /// The requested region is not in the tariff table.
    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    /// Annual savings are zero or negative, so there is no payback period.
    #[error("payback period is undefined for a monthly bill of {0}")]
    PaybackUndefined(Decimal),

    /// Roof area must be positive.
    #[error("roof area must be positive, got {0}")]
    InvalidRoofArea(Decimal),

    #[error("invalid estimator configuration: {0}")]
    InvalidConfig(#[from] EstimatorConfigError),

    /// An intermediate figure does not fit in a [`Decimal`].
    #[error("inputs too large: {0} overflowed")]
    Overflow(&'static str),
}

/// Turns a `checked_*` result into [`EstimateError::Overflow`] naming `step`.
fn checked(value: Option<Decimal>, step: &'static str) -> Result<Decimal, EstimateError> {
    value.ok_or(EstimateError::Overflow(step))
}

/// Errors in [`EstimatorConfig`] values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimatorConfigError {
    /// Values used as divisors must be positive.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: Decimal },

    /// The offset fraction must be in (0, 1].
    #[error("offset fraction must be between 0 and 1, got {0}")]
    InvalidOffsetFraction(Decimal),

    /// CO₂ offset per kW must not be negative.
    #[error("CO2 offset per kW per day must not be negative, got {0}")]
    NegativeCo2Offset(Decimal),

    #[error(transparent)]
    Subsidy(#[from] SubsidyPolicyError),
}

/// Fixed constants used by the estimator.
///
/// The defaults are the figures the calculator page has always used; they can
/// be overridden from configuration for what-if comparisons.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::calculations::{EstimatorConfig, SubsidyPolicy};
///
/// let config = EstimatorConfig {
///     cost_per_kw: dec!(45000),
///     subsidy_policy: SubsidyPolicy::FlatCeiling,
///     ..EstimatorConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Billing days per month used to convert monthly units to daily units.
    pub days_per_month: Decimal,

    /// Effective full-sun hours per day.
    pub peak_sun_hours: Decimal,

    /// Oversizing margin covering inverter, wiring and soiling losses.
    pub oversizing_factor: Decimal,

    /// Roof area needed per installed kW, in square feet.
    pub roof_area_per_kw: Decimal,

    /// Installed cost per kW, in currency.
    pub cost_per_kw: Decimal,

    /// Share of the bill the system is assumed to offset.
    pub offset_fraction: Decimal,

    /// Years over which savings and CO₂ offset are projected.
    pub system_lifetime_years: Decimal,

    /// CO₂ avoided per installed kW per day, in kg.
    pub co2_kg_per_kw_per_day: Decimal,

    pub subsidy_policy: SubsidyPolicy,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            days_per_month: Decimal::new(30, 0),
            peak_sun_hours: Decimal::new(45, 1),
            oversizing_factor: Decimal::new(13, 1),
            roof_area_per_kw: Decimal::new(100, 0),
            cost_per_kw: Decimal::new(50000, 0),
            offset_fraction: Decimal::new(8, 1),
            system_lifetime_years: Decimal::new(25, 0),
            co2_kg_per_kw_per_day: Decimal::new(15, 1),
            subsidy_policy: SubsidyPolicy::default(),
        }
    }
}

impl EstimatorConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`EstimatorConfigError`] if:
    /// - any divisor or scale (`days_per_month`, `peak_sun_hours`,
    ///   `oversizing_factor`, `roof_area_per_kw`, `cost_per_kw`,
    ///   `system_lifetime_years`) is not positive
    /// - `offset_fraction` is not in (0, 1]
    /// - `co2_kg_per_kw_per_day` is negative
    /// - the subsidy policy carries a fraction outside [0, 1]
    pub fn validate(&self) -> Result<(), EstimatorConfigError> {
        let positive = [
            ("days_per_month", self.days_per_month),
            ("peak_sun_hours", self.peak_sun_hours),
            ("oversizing_factor", self.oversizing_factor),
            ("roof_area_per_kw", self.roof_area_per_kw),
            ("cost_per_kw", self.cost_per_kw),
            ("system_lifetime_years", self.system_lifetime_years),
        ];
        if let Some((field, value)) = positive.into_iter().find(|(_, v)| *v <= Decimal::ZERO) {
            return Err(EstimatorConfigError::NotPositive { field, value });
        }
        if self.offset_fraction <= Decimal::ZERO || self.offset_fraction > Decimal::ONE {
            return Err(EstimatorConfigError::InvalidOffsetFraction(
                self.offset_fraction,
            ));
        }
        if self.co2_kg_per_kw_per_day < Decimal::ZERO {
            return Err(EstimatorConfigError::NegativeCo2Offset(
                self.co2_kg_per_kw_per_day,
            ));
        }
        self.subsidy_policy.validate()?;
        Ok(())
    }
}

/// Calculator for savings estimates over a fixed tariff table.
#[derive(Debug, Clone)]
pub struct SavingsEstimator<'a> {
    tariffs: &'a RegionTariffTable,
    config: EstimatorConfig,
}

impl<'a> SavingsEstimator<'a> {
    pub fn new(
        tariffs: &'a RegionTariffTable,
        config: EstimatorConfig,
    ) -> Self {
        Self { tariffs, config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn tariffs(&self) -> &RegionTariffTable {
        self.tariffs
    }

    /// Computes the full savings projection for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError`] if:
    /// - the configuration is invalid
    /// - `input.region_id` is not in the tariff table
    /// - the roof area is not positive
    /// - the monthly bill is not positive (no payback period exists)
    pub fn compute_estimate(
        &self,
        input: &EstimateInput,
    ) -> Result<EstimateResult, EstimateError> {
        self.config.validate()?;

        let tariff = self
            .tariffs
            .get(&input.region_id)
            .ok_or_else(|| EstimateError::UnknownRegion(input.region_id.clone()))?;

        if input.available_roof_area <= Decimal::ZERO {
            return Err(EstimateError::InvalidRoofArea(input.available_roof_area));
        }
        if input.monthly_bill_amount <= Decimal::ZERO {
            return Err(EstimateError::PaybackUndefined(input.monthly_bill_amount));
        }

        // Step 1
        let monthly_units_consumed = self.monthly_units(input.monthly_bill_amount, tariff)?;

        // Step 2
        let recommended_system_size_kw =
            self.system_size_kw(monthly_units_consumed, input.available_roof_area)?;

        // Steps 3-5
        let gross_system_cost = checked(
            recommended_system_size_kw.checked_mul(self.config.cost_per_kw),
            "gross system cost",
        )?;
        let subsidy_amount = self.config.subsidy_policy.apply(tariff, gross_system_cost);
        let net_cost = max(gross_system_cost - subsidy_amount, Decimal::ZERO);

        // Step 6
        let monthly_savings = checked(
            input.monthly_bill_amount.checked_mul(self.config.offset_fraction),
            "monthly savings",
        )?;
        let annual_savings = checked(
            monthly_savings.checked_mul(Decimal::from(12)),
            "annual savings",
        )?;

        // Step 7
        let payback_period_years = self.payback_years(net_cost, annual_savings, input)?;

        // Step 8
        let total_lifetime_savings = checked(
            annual_savings.checked_mul(self.config.system_lifetime_years),
            "lifetime savings",
        )?;
        let net_lifetime_savings = checked(
            total_lifetime_savings.checked_sub(net_cost),
            "net lifetime savings",
        )?;
        let twenty_five_year_return_pct = if net_cost.is_zero() {
            None
        } else {
            let ratio = net_lifetime_savings
                .checked_div(net_cost)
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED));
            Some(checked(ratio, "lifetime return")?)
        };

        // Step 9
        let co2_reduction_tons = self.co2_reduction_tons(recommended_system_size_kw)?;

        debug!(
            region = %tariff.region_id,
            size_kw = %recommended_system_size_kw,
            net_cost = %net_cost,
            payback_years = %payback_period_years,
            "estimate computed"
        );

        Ok(EstimateResult {
            monthly_units_consumed,
            recommended_system_size_kw,
            gross_system_cost,
            subsidy_amount,
            net_cost,
            monthly_savings,
            annual_savings,
            payback_period_years,
            twenty_five_year_return_pct,
            total_lifetime_savings,
            net_lifetime_savings,
            co2_reduction_tons,
        })
    }

    fn monthly_units(
        &self,
        monthly_bill: Decimal,
        tariff: &RegionTariff,
    ) -> Result<Decimal, EstimateError> {
        checked(monthly_bill.checked_div(tariff.unit_rate), "monthly units")
    }

    /// Consumption-based size, capped by what the roof can hold.
    fn system_size_kw(
        &self,
        monthly_units: Decimal,
        roof_area: Decimal,
    ) -> Result<Decimal, EstimateError> {
        let by_consumption = checked(
            monthly_units
                .checked_div(self.config.days_per_month)
                .and_then(|v| v.checked_div(self.config.peak_sun_hours))
                .and_then(|v| v.checked_mul(self.config.oversizing_factor)),
            "system size",
        )?;
        let by_roof = checked(
            roof_area.checked_div(self.config.roof_area_per_kw),
            "roof capacity",
        )?;

        if by_roof < by_consumption {
            debug!(
                by_consumption = %by_consumption,
                by_roof = %by_roof,
                "roof area limits system size"
            );
        }
        Ok(min(by_consumption, by_roof))
    }

    fn payback_years(
        &self,
        net_cost: Decimal,
        annual_savings: Decimal,
        input: &EstimateInput,
    ) -> Result<Decimal, EstimateError> {
        if annual_savings <= Decimal::ZERO {
            return Err(EstimateError::PaybackUndefined(input.monthly_bill_amount));
        }
        checked(net_cost.checked_div(annual_savings), "payback period")
    }

    fn co2_reduction_tons(
        &self,
        system_size_kw: Decimal,
    ) -> Result<Decimal, EstimateError> {
        let tons = system_size_kw
            .checked_mul(self.config.co2_kg_per_kw_per_day)
            .and_then(|v| v.checked_mul(Decimal::from(365)))
            .and_then(|v| v.checked_mul(self.config.system_lifetime_years))
            .and_then(|v| v.checked_div(Decimal::ONE_THOUSAND));
        checked(tons, "CO2 reduction")
    }
}

/// An [`EstimateResult`] rounded for display.
///
/// Money is in whole currency units, percentages whole, system size and
/// payback one decimal place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateSummary {
    pub system_size_kw: Decimal,
    pub gross_system_cost: Decimal,
    pub subsidy_amount: Decimal,
    pub net_cost: Decimal,
    pub monthly_savings: Decimal,
    pub annual_savings: Decimal,
    pub payback_period_years: Decimal,
    pub twenty_five_year_return_pct: Option<Decimal>,
    pub total_lifetime_savings: Decimal,
    pub net_lifetime_savings: Decimal,
    pub co2_reduction_tons: Decimal,
}

impl From<&EstimateResult> for EstimateSummary {
    fn from(result: &EstimateResult) -> Self {
        Self {
            system_size_kw: round_dp(result.recommended_system_size_kw, 1),
            gross_system_cost: round_whole(result.gross_system_cost),
            subsidy_amount: round_whole(result.subsidy_amount),
            net_cost: round_whole(result.net_cost),
            monthly_savings: round_whole(result.monthly_savings),
            annual_savings: round_whole(result.annual_savings),
            payback_period_years: round_dp(result.payback_period_years, 1),
            twenty_five_year_return_pct: result.twenty_five_year_return_pct.map(round_whole),
            total_lifetime_savings: round_whole(result.total_lifetime_savings),
            net_lifetime_savings: round_whole(result.net_lifetime_savings),
            co2_reduction_tons: round_whole(result.co2_reduction_tons),
        }
    }
}
