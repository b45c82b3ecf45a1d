//! Estimate pipeline.
//!
//! Runs the calculators in order over one validated [`EstimateInput`] and
//! collects every intermediate quantity into an [`EstimateResult`].

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::calculators::{aggregate, compute_labor, compute_material, plan_trips};
use super::models::EstimateInput;

/// Diagnostic shown for bad size, application rate or wage input.
pub const INVALID_INPUT_MESSAGE: &str =
    "Invalid input. Please enter valid numbers for Size, Application Rate, and Base Wage.";

/// Every intermediate and final quantity of one estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResult {
    pub needed_trips: Decimal,
    pub flat_fee_hours: Decimal,
    pub used_actual_hours: Decimal,
    pub overtime_hours: Decimal,
    pub total_work_hours: Decimal,
    pub hourly_labor_cost: Decimal,
    pub total_labor_cost: Decimal,
    pub overtime_cost: Decimal,
    pub material_unit_cost: Decimal,
    pub material_cost: Decimal,
    pub mobilization_cost: Decimal,
    pub misc_cost: Decimal,
    pub markup: Decimal,
    pub total_cost: Decimal,
    pub total_unit_cost: Decimal,
    pub user_cost: Decimal,
}

/// Why an input value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// NaN or infinite.
    NotFinite,
    /// Finite but outside the representable decimal range.
    OutOfRange,
    Negative,
    /// Zero where a positive value is required.
    NotPositive,
    /// Zero in a value the engine divides by.
    DivisionHazard,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidReason::NotFinite => "not a finite number",
            InvalidReason::OutOfRange => "out of range",
            InvalidReason::Negative => "must not be negative",
            InvalidReason::NotPositive => "must be greater than zero",
            InvalidReason::DivisionHazard => "must be greater than zero (used as a divisor)",
        };
        f.write_str(text)
    }
}

/// Estimate error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("invalid input for {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: InvalidReason,
    },
}

impl EstimateError {
    pub fn invalid(field: &'static str, reason: InvalidReason) -> Self {
        EstimateError::InvalidInput { field, reason }
    }

    pub fn field(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { field, .. } => field,
        }
    }

    pub fn is_division_hazard(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidInput {
                reason: InvalidReason::DivisionHazard,
                ..
            }
        )
    }

    /// Single-line diagnostic for whoever entered the job.
    pub fn user_message(&self) -> String {
        match self.field() {
            "size_sqft" | "application_rate_sqft_per_gal" | "base_wage_per_hour" => {
                INVALID_INPUT_MESSAGE.to_string()
            }
            other => format!("Invalid input. Please enter a valid value for {}.", other),
        }
    }
}

/// Compute the full estimate for one job.
///
/// Rejects zero divisors before any stage runs; all other validation happens
/// when the request is turned into an [`EstimateInput`]. A stage whose result
/// leaves the decimal range fails with [`InvalidReason::OutOfRange`].
pub fn calculate_estimate(input: &EstimateInput) -> Result<EstimateResult, EstimateError> {
    check_divisors(input)?;

    let job = &input.job;

    let trips = plan_trips(job.size_sqft, job.application_rate_sqft_per_gal, &input.drone)?;
    debug!(
        needed_trips = %trips.needed_trips,
        flat_fee_hours = %trips.flat_fee_hours,
        "Planned drone trips"
    );

    let labor = compute_labor(
        trips.flat_fee_hours,
        &input.labor,
        input.drone.overtime_hourly_charge,
    )?;
    debug!(
        overtime_hours = %labor.overtime_hours,
        total_labor_cost = %labor.total_labor_cost,
        overtime_cost = %labor.overtime_cost,
        "Computed labor cost"
    );

    let material = compute_material(
        job.material_type,
        job.application_rate_sqft_per_gal,
        job.size_sqft,
        &input.pricing,
    )?;
    debug!(
        material = %job.material_type,
        material_cost = %material.material_cost,
        "Computed material cost"
    );

    let totals = aggregate(
        material.material_cost,
        labor.total_labor_cost,
        labor.overtime_cost,
        job.size_sqft,
        &input.pricing,
    )?;

    info!(
        job_name = %input.details.job_name,
        needed_trips = %trips.needed_trips,
        user_cost = %totals.user_cost,
        "Estimate computed"
    );

    Ok(EstimateResult {
        needed_trips: trips.needed_trips,
        flat_fee_hours: trips.flat_fee_hours,
        used_actual_hours: labor.used_actual_hours,
        overtime_hours: labor.overtime_hours,
        total_work_hours: labor.total_work_hours,
        hourly_labor_cost: labor.hourly_labor_cost,
        total_labor_cost: labor.total_labor_cost,
        overtime_cost: labor.overtime_cost,
        material_unit_cost: material.unit_cost,
        material_cost: material.material_cost,
        mobilization_cost: totals.mobilization_cost,
        misc_cost: totals.misc_cost,
        markup: totals.markup,
        total_cost: totals.total_cost,
        total_unit_cost: totals.total_unit_cost,
        user_cost: totals.user_cost,
    })
}

fn check_divisors(input: &EstimateInput) -> Result<(), EstimateError> {
    let divisors = [
        ("size_sqft", input.job.size_sqft),
        (
            "application_rate_sqft_per_gal",
            input.job.application_rate_sqft_per_gal,
        ),
        ("avg_area_per_trip_sqft", input.drone.avg_area_per_trip_sqft),
    ];

    for (field, value) in divisors {
        if value <= Decimal::ZERO {
            return Err(EstimateError::invalid(field, InvalidReason::DivisionHazard));
        }
    }
    Ok(())
}
