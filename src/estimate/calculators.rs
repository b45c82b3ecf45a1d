//! Core estimation calculation functions.
//!
//! Pure functions for estimate math - no I/O, no shared state.
//! Each stage takes the validated input (or the previous stage's output) and
//! returns a small result struct; [`super::services::calculate_estimate`]
//! composes them in order: trips, labor, material, pricing.
//!
//! All arithmetic is checked. A product or quotient that leaves the decimal
//! range is reported as an out-of-range input instead of panicking.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::models::{DroneOpsConfig, LaborConfig, MaterialType, PricingConfig};
use super::services::{EstimateError, InvalidReason};

/// Payroll taxes and benefits (35%) plus overhead (25%), applied as one factor.
pub const LABOR_LOADING_FACTOR: Decimal = dec!(1.60);

/// Setup/buffer hour added to every flat-fee quote.
pub const SETUP_BUFFER_HOURS: Decimal = dec!(1);

/// Decimal places kept on the overtime cost and the pre-overtime sum.
///
/// At this scale, and below [`MAX_MONEY`], taking overtime out of the total
/// and adding it back is exact.
pub const MONEY_SCALE: u32 = 12;

/// Largest overtime cost or customer price an estimate can carry.
pub const MAX_MONEY: Decimal = dec!(1000000000000000);

const MINUTES_PER_HOUR: Decimal = dec!(60);
const GALLONS_PER_PAIL: Decimal = dec!(5);
const PERCENT: Decimal = dec!(100);

/// Round to specified decimal places, halves away from zero.
///
/// Quotes shown to customers round 2.5 up to 3, the way a calculator or a
/// spreadsheet does.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use dronecure_estimator::estimate::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(305.775), 2), dec!(305.78));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

fn in_range(value: Option<Decimal>, field: &'static str) -> Result<Decimal, EstimateError> {
    value.ok_or_else(|| EstimateError::invalid(field, InvalidReason::OutOfRange))
}

/// Result of sizing a job into drone trips
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    /// Whole number of trips, rounded up.
    pub needed_trips: Decimal,
    pub flat_fee_hours: Decimal,
}

/// Size a job into whole drone trips and the flat-fee hours they take.
///
/// The drone's nominal area per trip is scaled by the ratio of its reference
/// application rate to the requested one, so a heavier application (fewer
/// sqft per gallon) covers less ground per trip.
///
/// Both `avg_area_per_trip_sqft` and `application_rate` must be non-zero;
/// the caller validates this.
pub fn plan_trips(
    size_sqft: Decimal,
    application_rate: Decimal,
    drone: &DroneOpsConfig,
) -> Result<TripPlan, EstimateError> {
    // (size / area) * (ref / rate), with a single division so whole trip
    // counts stay exact.
    let coverage = in_range(
        size_sqft.checked_mul(drone.reference_application_rate_per_trip),
        "size_sqft",
    )?;
    let capacity = in_range(
        drone.avg_area_per_trip_sqft.checked_mul(application_rate),
        "avg_area_per_trip_sqft",
    )?;
    let trips = in_range(
        coverage.checked_div(capacity),
        "application_rate_sqft_per_gal",
    )?;
    let needed_trips = trips.ceil();

    let trip_minutes = in_range(
        needed_trips.checked_mul(drone.avg_minutes_per_trip),
        "avg_minutes_per_trip",
    )?;
    let flat_fee_hours = in_range(
        (trip_minutes / MINUTES_PER_HOUR).checked_add(SETUP_BUFFER_HOURS),
        "size_sqft",
    )?;

    Ok(TripPlan {
        needed_trips,
        flat_fee_hours,
    })
}

/// Result of labor costing
#[derive(Debug, Clone, PartialEq)]
pub struct LaborCost {
    pub used_actual_hours: Decimal,
    pub overtime_hours: Decimal,
    pub total_work_hours: Decimal,
    pub hourly_labor_cost: Decimal,
    pub total_labor_cost: Decimal,
    /// Kept at [`MONEY_SCALE`] decimals.
    pub overtime_cost: Decimal,
}

/// Cost the crew for a job.
///
/// Hours beyond the flat-fee hours are overtime and are charged separately at
/// `overtime_hourly_charge`, not at the loaded labor rate. Commute hours are
/// billed once regardless of overtime.
pub fn compute_labor(
    flat_fee_hours: Decimal,
    labor: &LaborConfig,
    overtime_hourly_charge: Decimal,
) -> Result<LaborCost, EstimateError> {
    let used_actual_hours = labor.actual_work_hours.unwrap_or(flat_fee_hours);
    let overtime_hours = (used_actual_hours - flat_fee_hours).max(Decimal::ZERO);
    let total_work_hours = in_range(
        flat_fee_hours
            .checked_add(overtime_hours)
            .and_then(|hours| hours.checked_add(labor.commute_hours)),
        "commute_hours",
    )?;

    let hourly_labor_cost = in_range(
        labor.base_wage_per_hour.checked_mul(LABOR_LOADING_FACTOR),
        "base_wage_per_hour",
    )?;
    let crew_rate = in_range(
        hourly_labor_cost.checked_add(labor.hourly_power_cost),
        "hourly_power_cost",
    )?;
    let total_labor_cost = in_range(
        crew_rate.checked_mul(total_work_hours),
        "base_wage_per_hour",
    )?;
    let overtime_cost = in_range(
        overtime_hours.checked_mul(overtime_hourly_charge),
        "overtime_hourly_charge",
    )?
    .round_dp(MONEY_SCALE);

    Ok(LaborCost {
        used_actual_hours,
        overtime_hours,
        total_work_hours,
        hourly_labor_cost,
        total_labor_cost,
        overtime_cost,
    })
}

/// Result of material costing
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialCost {
    pub price_per_5gal: Decimal,
    /// Cost per square foot.
    pub unit_cost: Decimal,
    pub material_cost: Decimal,
}

/// Cost the curing compound for a job.
///
/// `application_rate` is coverage in sqft per gallon and must be non-zero.
pub fn compute_material(
    material: MaterialType,
    application_rate: Decimal,
    size_sqft: Decimal,
    pricing: &PricingConfig,
) -> Result<MaterialCost, EstimateError> {
    let price_per_5gal = pricing.price_per_5gal(material);
    let unit_cost = in_range(
        (price_per_5gal / GALLONS_PER_PAIL).checked_div(application_rate),
        "application_rate_sqft_per_gal",
    )?;
    let material_cost = in_range(unit_cost.checked_mul(size_sqft), "size_sqft")?;

    Ok(MaterialCost {
        price_per_5gal,
        unit_cost,
        material_cost,
    })
}

/// Result of the final pricing roll-up
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTotals {
    pub mobilization_cost: Decimal,
    pub misc_cost: Decimal,
    pub markup: Decimal,
    /// Price before overtime.
    pub total_cost: Decimal,
    pub total_unit_cost: Decimal,
    /// Customer-facing price, overtime included.
    pub user_cost: Decimal,
}

/// Roll material and labor costs up into the customer price.
///
/// Misc is charged on material, flat-fee labor and mobilization. Markup is
/// charged on labor, mobilization and misc only; material passes through at
/// cost. Overtime never enters either base: it is taken out of `total_cost`
/// and added back only in `user_cost`, so `user_cost - total_cost` is exactly
/// the overtime cost.
pub fn aggregate(
    material_cost: Decimal,
    total_labor_cost: Decimal,
    overtime_cost: Decimal,
    size_sqft: Decimal,
    pricing: &PricingConfig,
) -> Result<PricingTotals, EstimateError> {
    let mobilization_cost = pricing.mobilization_cost;

    let misc_base = in_range(
        material_cost
            .checked_add(total_labor_cost)
            .and_then(|sum| sum.checked_add(mobilization_cost)),
        "mobilization_cost",
    )?;
    let misc_cost = in_range(
        (pricing.misc_rate_pct / PERCENT).checked_mul(misc_base),
        "misc_rate_pct",
    )?;

    let markup_base = in_range(
        total_labor_cost
            .checked_add(mobilization_cost)
            .and_then(|sum| sum.checked_add(misc_cost)),
        "mobilization_cost",
    )?;
    let markup = in_range(
        (pricing.markup_rate_pct / PERCENT).checked_mul(markup_base),
        "markup_rate_pct",
    )?;

    let gross = in_range(
        misc_base
            .checked_add(misc_cost)
            .and_then(|sum| sum.checked_add(markup)),
        "markup_rate_pct",
    )?
    .round_dp(MONEY_SCALE);
    if gross > MAX_MONEY {
        return Err(EstimateError::invalid("size_sqft", InvalidReason::OutOfRange));
    }
    let overtime_cost = overtime_cost.round_dp(MONEY_SCALE);
    if overtime_cost > MAX_MONEY {
        return Err(EstimateError::invalid(
            "overtime_hourly_charge",
            InvalidReason::OutOfRange,
        ));
    }

    let total_cost = gross - overtime_cost;
    let user_cost = total_cost + overtime_cost;
    let total_unit_cost = in_range(total_cost.checked_div(size_sqft), "size_sqft")?;

    Ok(PricingTotals {
        mobilization_cost,
        misc_cost,
        markup,
        total_cost,
        total_unit_cost,
        user_cost,
    })
}
