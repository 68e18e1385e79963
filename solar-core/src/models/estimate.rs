use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs for one savings estimate, as collected by the calculator form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateInput {
    /// Current monthly electricity bill, in currency.
    pub monthly_bill_amount: Decimal,
    /// Usable roof area in square feet.
    pub available_roof_area: Decimal,
    pub region_id: String,
}

impl EstimateInput {
    /// Slider bounds offered by the calculator form.
    pub const BILL_RANGE: (Decimal, Decimal) = (
        Decimal::from_parts(1000, 0, 0, false, 0),
        Decimal::from_parts(20000, 0, 0, false, 0),
    );
    pub const ROOF_AREA_RANGE: (Decimal, Decimal) = (
        Decimal::from_parts(100, 0, 0, false, 0),
        Decimal::from_parts(2000, 0, 0, false, 0),
    );

    pub fn new(
        monthly_bill_amount: Decimal,
        available_roof_area: Decimal,
        region_id: impl Into<String>,
    ) -> Self {
        Self {
            monthly_bill_amount,
            available_roof_area,
            region_id: region_id.into(),
        }
    }

    /// Returns a copy with bill and roof area pulled into the form's slider
    /// ranges.
    pub fn clamp_to_form_bounds(&self) -> Self {
        let (bill_min, bill_max) = Self::BILL_RANGE;
        let (roof_min, roof_max) = Self::ROOF_AREA_RANGE;
        Self {
            monthly_bill_amount: self.monthly_bill_amount.clamp(bill_min, bill_max),
            available_roof_area: self.available_roof_area.clamp(roof_min, roof_max),
            region_id: self.region_id.clone(),
        }
    }

    pub fn is_within_form_bounds(&self) -> bool {
        self.clamp_to_form_bounds() == *self
    }
}

/// Full-precision estimate derived from an [`EstimateInput`] and its tariff.
///
/// Values are not rounded; see `EstimateSummary` for the display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub monthly_units_consumed: Decimal,
    pub recommended_system_size_kw: Decimal,
    pub gross_system_cost: Decimal,
    pub subsidy_amount: Decimal,
    pub net_cost: Decimal,
    pub monthly_savings: Decimal,
    pub annual_savings: Decimal,
    pub payback_period_years: Decimal,
    /// `None` when the subsidy covers the whole system and there is no net
    /// cost to return on.
    pub twenty_five_year_return_pct: Option<Decimal>,
    pub total_lifetime_savings: Decimal,
    pub net_lifetime_savings: Decimal,
    pub co2_reduction_tons: Decimal,
}
