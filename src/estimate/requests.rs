//! Request DTOs for estimates.
//!
//! Numbers arrive as plain `f64` (from JSON or the command line) and are
//! converted to [`Decimal`] exactly once, in [`EstimateRequest::validate`].

use std::io::Read;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::models::{
    DroneOpsConfig, EstimateInput, JobDetails, JobSpec, LaborConfig, MaterialType, PricingConfig,
};
use super::services::{EstimateError, InvalidReason};

/// Request to estimate a single job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub details: JobDetails,
    pub job: JobRequest,
    pub labor: LaborRequest,
    pub drone: DroneOpsRequest,
    pub pricing: PricingRequest,
}

/// The placement being cured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub size_sqft: f64,
    pub application_rate_sqft_per_gal: f64,
    #[serde(default)]
    pub material_type: MaterialType,
}

/// Crew cost inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborRequest {
    pub base_wage_per_hour: f64,
    pub hourly_power_cost: f64,
    pub commute_hours: f64,
    #[serde(default)]
    pub actual_work_hours: Option<f64>,
}

/// Drone throughput inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneOpsRequest {
    pub avg_minutes_per_trip: f64,
    pub avg_area_per_trip_sqft: f64,
    pub reference_application_rate_per_trip: f64,
    pub overtime_hourly_charge: f64,
}

/// Business rates and material prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub mobilization_cost: f64,
    pub misc_rate_pct: f64,
    pub markup_rate_pct: f64,
    pub final_cure_price_per_5gal: f64,
    pub evap_retarder_price_per_5gal: f64,
}

impl EstimateRequest {
    /// Read a request encoded as JSON.
    pub fn from_reader<R: Read>(mut reader: R) -> crate::Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Parse every number into a [`Decimal`], failing on the first bad field.
    ///
    /// NaN and infinities are rejected, as are negative amounts. Values the
    /// engine divides by must be strictly positive. Nothing is clamped.
    pub fn validate(self) -> Result<EstimateInput, EstimateError> {
        self.into_input().map_err(|err| {
            warn!(field = err.field(), error = %err, "Rejected estimate request");
            err
        })
    }

    fn into_input(self) -> Result<EstimateInput, EstimateError> {
        // Size, application rate and wage first, in the order they are reported.
        let job = JobSpec {
            size_sqft: divisor("size_sqft", self.job.size_sqft)?,
            application_rate_sqft_per_gal: divisor(
                "application_rate_sqft_per_gal",
                self.job.application_rate_sqft_per_gal,
            )?,
            material_type: self.job.material_type,
        };

        let labor = LaborConfig {
            base_wage_per_hour: positive("base_wage_per_hour", self.labor.base_wage_per_hour)?,
            hourly_power_cost: non_negative("hourly_power_cost", self.labor.hourly_power_cost)?,
            commute_hours: non_negative("commute_hours", self.labor.commute_hours)?,
            actual_work_hours: self
                .labor
                .actual_work_hours
                .map(|hours| non_negative("actual_work_hours", hours))
                .transpose()?,
        };

        let drone = DroneOpsConfig {
            avg_minutes_per_trip: non_negative(
                "avg_minutes_per_trip",
                self.drone.avg_minutes_per_trip,
            )?,
            avg_area_per_trip_sqft: divisor(
                "avg_area_per_trip_sqft",
                self.drone.avg_area_per_trip_sqft,
            )?,
            reference_application_rate_per_trip: non_negative(
                "reference_application_rate_per_trip",
                self.drone.reference_application_rate_per_trip,
            )?,
            overtime_hourly_charge: non_negative(
                "overtime_hourly_charge",
                self.drone.overtime_hourly_charge,
            )?,
        };

        let pricing = PricingConfig {
            mobilization_cost: non_negative("mobilization_cost", self.pricing.mobilization_cost)?,
            misc_rate_pct: non_negative("misc_rate_pct", self.pricing.misc_rate_pct)?,
            markup_rate_pct: non_negative("markup_rate_pct", self.pricing.markup_rate_pct)?,
            final_cure_price_per_5gal: non_negative(
                "final_cure_price_per_5gal",
                self.pricing.final_cure_price_per_5gal,
            )?,
            evap_retarder_price_per_5gal: non_negative(
                "evap_retarder_price_per_5gal",
                self.pricing.evap_retarder_price_per_5gal,
            )?,
        };

        Ok(EstimateInput {
            details: self.details,
            job,
            labor,
            drone,
            pricing,
        })
    }
}

impl TryFrom<EstimateRequest> for EstimateInput {
    type Error = EstimateError;

    fn try_from(request: EstimateRequest) -> Result<Self, Self::Error> {
        request.validate()
    }
}

fn finite(field: &'static str, value: f64) -> Result<Decimal, EstimateError> {
    if !value.is_finite() {
        return Err(EstimateError::invalid(field, InvalidReason::NotFinite));
    }
    Decimal::try_from(value).map_err(|_| EstimateError::invalid(field, InvalidReason::OutOfRange))
}

fn non_negative(field: &'static str, value: f64) -> Result<Decimal, EstimateError> {
    let amount = finite(field, value)?;
    if amount < Decimal::ZERO {
        return Err(EstimateError::invalid(field, InvalidReason::Negative));
    }
    Ok(amount)
}

fn positive(field: &'static str, value: f64) -> Result<Decimal, EstimateError> {
    let amount = non_negative(field, value)?;
    if amount.is_zero() {
        return Err(EstimateError::invalid(field, InvalidReason::NotPositive));
    }
    Ok(amount)
}

fn divisor(field: &'static str, value: f64) -> Result<Decimal, EstimateError> {
    let amount = non_negative(field, value)?;
    if amount.is_zero() {
        return Err(EstimateError::invalid(field, InvalidReason::DivisionHazard));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> EstimateRequest {
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
    }

    #[test]
    fn test_validate_converts_to_decimal() {
        let input = request().validate().unwrap();
        assert_eq!(input.job.size_sqft, dec!(5000));
        assert_eq!(input.job.application_rate_sqft_per_gal, dec!(400));
        assert_eq!(input.labor.base_wage_per_hour, dec!(30));
        assert_eq!(input.labor.actual_work_hours, None);
        assert_eq!(input.pricing.final_cure_price_per_5gal, dec!(122.31));
        assert_eq!(input.pricing.evap_retarder_price_per_5gal, dec!(21.87));
    }

    #[test]
    fn test_validate_keeps_actual_hours_override() {
        let mut req = request();
        req.labor.actual_work_hours = Some(3.5);
        let input = req.validate().unwrap();
        assert_eq!(input.labor.actual_work_hours, Some(dec!(3.5)));
    }

    #[test]
    fn test_validate_rejects_nan_size() {
        let mut req = request();
        req.job.size_sqft = f64::NAN;
        let err = req.validate().unwrap_err();
        assert_eq!(
            err,
            EstimateError::invalid("size_sqft", InvalidReason::NotFinite)
        );
    }

    #[test]
    fn test_validate_rejects_infinite_wage() {
        let mut req = request();
        req.labor.base_wage_per_hour = f64::INFINITY;
        let err = req.validate().unwrap_err();
        assert_eq!(err.field(), "base_wage_per_hour");
        assert_eq!(
            err.user_message(),
            "Invalid input. Please enter valid numbers for Size, Application Rate, and Base Wage."
        );
    }

    #[test]
    fn test_validate_rejects_zero_application_rate_as_division_hazard() {
        let mut req = request();
        req.job.application_rate_sqft_per_gal = 0.0;
        let err = req.validate().unwrap_err();
        assert!(err.is_division_hazard());
    }

    #[test]
    fn test_validate_rejects_zero_area_per_trip() {
        let mut req = request();
        req.drone.avg_area_per_trip_sqft = 0.0;
        let err = req.validate().unwrap_err();
        assert_eq!(err.field(), "avg_area_per_trip_sqft");
        assert!(err.is_division_hazard());
    }

    #[test]
    fn test_validate_rejects_negative_amounts_without_clamping() {
        let mut req = request();
        req.pricing.markup_rate_pct = -5.0;
        let err = req.validate().unwrap_err();
        assert_eq!(
            err,
            EstimateError::invalid("markup_rate_pct", InvalidReason::Negative)
        );

        let mut req = request();
        req.labor.actual_work_hours = Some(-1.0);
        let err = req.validate().unwrap_err();
        assert_eq!(err.field(), "actual_work_hours");
    }

    #[test]
    fn test_validate_rejects_zero_wage() {
        let mut req = request();
        req.labor.base_wage_per_hour = 0.0;
        let err = req.validate().unwrap_err();
        assert_eq!(
            err,
            EstimateError::invalid("base_wage_per_hour", InvalidReason::NotPositive)
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut req = request();
        req.job.size_sqft = 1e40;
        let err = req.validate().unwrap_err();
        assert_eq!(
            err,
            EstimateError::invalid("size_sqft", InvalidReason::OutOfRange)
        );
    }

    #[test]
    fn test_huge_size_passes_validation_but_fails_estimate_cleanly() {
        let mut req = request();
        req.job.size_sqft = 1e26;
        let input = req.validate().unwrap();

        let err = crate::estimate::calculate_estimate(&input).unwrap_err();
        assert_eq!(
            err,
            EstimateError::invalid("size_sqft", InvalidReason::OutOfRange)
        );
    }

    #[test]
    fn test_validate_allows_zero_rates() {
        let mut req = request();
        req.pricing.misc_rate_pct = 0.0;
        req.pricing.markup_rate_pct = 0.0;
        req.labor.commute_hours = 0.0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_try_from_matches_validate() {
        let input = EstimateInput::try_from(request()).unwrap();
        assert_eq!(input, request().validate().unwrap());
    }

    #[test]
    fn test_deserialize_request_json() {
        let json = r#"{
            "details": {"job_name": "Dock 4", "address": "12 Harbor Rd", "date": "05/01/2025"},
            "job": {"size_sqft": 12000, "application_rate_sqft_per_gal": 300, "material_type": "Evaporation Retarder"},
            "labor": {"base_wage_per_hour": 35, "hourly_power_cost": 5, "commute_hours": 1.5, "actual_work_hours": 6},
            "drone": {"avg_minutes_per_trip": 10, "avg_area_per_trip_sqft": 4500,
                      "reference_application_rate_per_trip": 1600, "overtime_hourly_charge": 65},
            "pricing": {"mobilization_cost": 100, "misc_rate_pct": 10, "markup_rate_pct": 40,
                        "final_cure_price_per_5gal": 122.31, "evap_retarder_price_per_5gal": 21.87}
        }"#;

        let req: EstimateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.details.job_name, "Dock 4");
        assert_eq!(req.details.display_date(), "05/01/2025");
        assert_eq!(req.job.material_type, MaterialType::EvaporationRetarder);
        assert_eq!(req.labor.actual_work_hours, Some(6.0));

        let input = req.validate().unwrap();
        assert_eq!(input.labor.commute_hours, dec!(1.5));
    }

    #[test]
    fn test_from_reader_reports_malformed_json() {
        let err = EstimateRequest::from_reader(r#"{"job": {"size_sqft": "big"}}"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, crate::error::AppError::Json(_)));
    }

    #[test]
    fn test_from_reader_round_trips_request() {
        let json = serde_json::to_string(&request()).unwrap();
        let back = EstimateRequest::from_reader(json.as_bytes()).unwrap();
        assert_eq!(back, request());
    }

    #[test]
    fn test_deserialize_request_defaults_material_and_override() {
        let json = r#"{
            "job": {"size_sqft": 100, "application_rate_sqft_per_gal": 400},
            "labor": {"base_wage_per_hour": 30, "hourly_power_cost": 5, "commute_hours": 2},
            "drone": {"avg_minutes_per_trip": 10, "avg_area_per_trip_sqft": 4500,
                      "reference_application_rate_per_trip": 1600, "overtime_hourly_charge": 65},
            "pricing": {"mobilization_cost": 100, "misc_rate_pct": 10, "markup_rate_pct": 40,
                        "final_cure_price_per_5gal": 122.31, "evap_retarder_price_per_5gal": 21.87}
        }"#;

        let req: EstimateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.job.material_type, MaterialType::FinalCure);
        assert_eq!(req.labor.actual_work_hours, None);
        assert_eq!(req.details, JobDetails::default());
    }
}
