//! Response DTOs for estimates.

use rust_decimal::Decimal;
use serde::Serialize;

use super::models::{EstimateInput, JobDetails, MaterialType};
use super::report::EstimateSummary;
use super::services::{EstimateError, EstimateResult};

/// Currency every estimate is quoted in.
pub const CURRENCY: &str = "USD";

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn usd(amount: Decimal) -> Self {
        Self {
            amount,
            currency: CURRENCY.to_string(),
        }
    }
}

/// Response for a computed estimate: the full-precision breakdown plus the
/// rounded customer summary.
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub details: JobDetails,
    pub material_type: MaterialType,
    #[serde(with = "rust_decimal::serde::str")]
    pub size_sqft: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub needed_trips: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub flat_fee_hours: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub used_actual_hours: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub overtime_hours: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_work_hours: Decimal,
    pub hourly_labor_cost: MoneyResponse,
    pub total_labor_cost: MoneyResponse,
    pub overtime_cost: MoneyResponse,
    pub material_unit_cost: MoneyResponse,
    pub material_cost: MoneyResponse,
    pub mobilization_cost: MoneyResponse,
    pub misc_cost: MoneyResponse,
    pub markup: MoneyResponse,
    pub total_cost: MoneyResponse,
    pub total_unit_cost: MoneyResponse,
    pub user_cost: MoneyResponse,
    pub summary: EstimateSummary,
}

impl EstimateResponse {
    pub fn new(input: &EstimateInput, result: &EstimateResult) -> Self {
        Self {
            details: input.details.clone(),
            material_type: input.job.material_type,
            size_sqft: input.job.size_sqft,
            needed_trips: result.needed_trips.normalize(),
            flat_fee_hours: result.flat_fee_hours,
            used_actual_hours: result.used_actual_hours,
            overtime_hours: result.overtime_hours,
            total_work_hours: result.total_work_hours,
            hourly_labor_cost: MoneyResponse::usd(result.hourly_labor_cost),
            total_labor_cost: MoneyResponse::usd(result.total_labor_cost),
            overtime_cost: MoneyResponse::usd(result.overtime_cost),
            material_unit_cost: MoneyResponse::usd(result.material_unit_cost),
            material_cost: MoneyResponse::usd(result.material_cost),
            mobilization_cost: MoneyResponse::usd(result.mobilization_cost),
            misc_cost: MoneyResponse::usd(result.misc_cost),
            markup: MoneyResponse::usd(result.markup),
            total_cost: MoneyResponse::usd(result.total_cost),
            total_unit_cost: MoneyResponse::usd(result.total_unit_cost),
            user_cost: MoneyResponse::usd(result.user_cost),
            summary: EstimateSummary::new(input, result),
        }
    }
}

/// Error response for a rejected request
#[derive(Debug, Serialize)]
pub struct EstimateErrorResponse {
    pub error_type: String,
    pub field: String,
    pub message: String,
}

impl From<&EstimateError> for EstimateErrorResponse {
    fn from(err: &EstimateError) -> Self {
        Self {
            error_type: "invalid_input".to_string(),
            field: err.field().to_string(),
            message: err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::requests::{
        DroneOpsRequest, EstimateRequest, JobRequest, LaborRequest, PricingRequest,
    };
    use crate::estimate::services::{calculate_estimate, InvalidReason};
    use rust_decimal_macros::dec;

    fn input() -> EstimateInput {
        EstimateRequest {
            details: JobDetails::default(),
            job: JobRequest {
                size_sqft: 5000.0,
                application_rate_sqft_per_gal: 400.0,
                material_type: MaterialType::FinalCure,
            },
            labor: LaborRequest {
                base_wage_per_hour: 30.0,
                hourly_power_cost: 5.0,
                commute_hours: 2.0,
                actual_work_hours: None,
            },
            drone: DroneOpsRequest {
                avg_minutes_per_trip: 10.0,
                avg_area_per_trip_sqft: 4500.0,
                reference_application_rate_per_trip: 1600.0,
                overtime_hourly_charge: 65.0,
            },
            pricing: PricingRequest {
                mobilization_cost: 100.0,
                misc_rate_pct: 10.0,
                markup_rate_pct: 40.0,
                final_cure_price_per_5gal: 122.31,
                evap_retarder_price_per_5gal: 21.87,
            },
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_estimate_response_json_shape() {
        let input = input();
        let result = calculate_estimate(&input).unwrap();
        let json = serde_json::to_value(EstimateResponse::new(&input, &result)).unwrap();

        let amount = |v: &serde_json::Value| v.as_str().unwrap().parse::<Decimal>().unwrap();

        assert_eq!(json["material_type"], "final_cure");
        assert_eq!(json["needed_trips"], "5");
        assert_eq!(amount(&json["material_cost"]["amount"]), dec!(305.775));
        assert_eq!(json["material_cost"]["currency"], "USD");
        assert_eq!(amount(&json["mobilization_cost"]["amount"]), dec!(100));
        assert_eq!(json["summary"]["user_cost"], "815.46");
    }

    #[test]
    fn test_error_response_from_estimate_error() {
        let err = EstimateError::invalid(
            "application_rate_sqft_per_gal",
            InvalidReason::DivisionHazard,
        );
        let response = EstimateErrorResponse::from(&err);
        assert_eq!(response.error_type, "invalid_input");
        assert_eq!(response.field, "application_rate_sqft_per_gal");
        assert!(response.message.starts_with("Invalid input."));
    }
}
