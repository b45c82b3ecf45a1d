//! Standing shop rates.
//!
//! Everything an estimate needs except the job itself. Defaults match the
//! rates the business quotes with; each can be overridden through a
//! `DRONECURE_*` environment variable (a `.env` file is honoured).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::estimate::requests::{DroneOpsRequest, LaborRequest, PricingRequest};

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "DRONECURE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub base_wage_per_hour: f64,
    pub hourly_power_cost: f64,
    pub commute_hours: f64,
    pub avg_minutes_per_trip: f64,
    pub avg_area_per_trip_sqft: f64,
    pub reference_application_rate_per_trip: f64,
    pub overtime_hourly_charge: f64,
    pub mobilization_cost: f64,
    pub misc_rate_pct: f64,
    pub markup_rate_pct: f64,
    pub final_cure_price_per_5gal: f64,
    pub evap_retarder_price_per_5gal: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            // Entry-level skilled tier
            base_wage_per_hour: 30.0,
            hourly_power_cost: 5.0,
            commute_hours: 2.0,
            avg_minutes_per_trip: 10.0,
            avg_area_per_trip_sqft: 4500.0,
            reference_application_rate_per_trip: 1600.0,
            overtime_hourly_charge: 65.0,
            mobilization_cost: 100.0,
            misc_rate_pct: 10.0,
            markup_rate_pct: 40.0,
            final_cure_price_per_5gal: 122.31,
            evap_retarder_price_per_5gal: 21.87,
        }
    }
}

impl EstimatorConfig {
    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep their
    /// default; anything else must parse as a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let read = |name: &str, default: f64| -> Result<f64> {
            let key = format!("{}{}", ENV_PREFIX, name);
            match lookup(&key).filter(|raw| !raw.trim().is_empty()) {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| AppError::Config(format!("{}={:?}: {}", key, raw, e))),
                None => Ok(default),
            }
        };

        Ok(Self {
            base_wage_per_hour: read("BASE_WAGE_PER_HOUR", d.base_wage_per_hour)?,
            hourly_power_cost: read("HOURLY_POWER_COST", d.hourly_power_cost)?,
            commute_hours: read("COMMUTE_HOURS", d.commute_hours)?,
            avg_minutes_per_trip: read("AVG_MINUTES_PER_TRIP", d.avg_minutes_per_trip)?,
            avg_area_per_trip_sqft: read("AVG_AREA_PER_TRIP_SQFT", d.avg_area_per_trip_sqft)?,
            reference_application_rate_per_trip: read(
                "REFERENCE_APPLICATION_RATE_PER_TRIP",
                d.reference_application_rate_per_trip,
            )?,
            overtime_hourly_charge: read("OVERTIME_HOURLY_CHARGE", d.overtime_hourly_charge)?,
            mobilization_cost: read("MOBILIZATION_COST", d.mobilization_cost)?,
            misc_rate_pct: read("MISC_RATE_PCT", d.misc_rate_pct)?,
            markup_rate_pct: read("MARKUP_RATE_PCT", d.markup_rate_pct)?,
            final_cure_price_per_5gal: read(
                "FINAL_CURE_PRICE_PER_5GAL",
                d.final_cure_price_per_5gal,
            )?,
            evap_retarder_price_per_5gal: read(
                "EVAP_RETARDER_PRICE_PER_5GAL",
                d.evap_retarder_price_per_5gal,
            )?,
        })
    }

    pub fn labor_request(&self, actual_work_hours: Option<f64>) -> LaborRequest {
        LaborRequest {
            base_wage_per_hour: self.base_wage_per_hour,
            hourly_power_cost: self.hourly_power_cost,
            commute_hours: self.commute_hours,
            actual_work_hours,
        }
    }

    pub fn drone_request(&self) -> DroneOpsRequest {
        DroneOpsRequest {
            avg_minutes_per_trip: self.avg_minutes_per_trip,
            avg_area_per_trip_sqft: self.avg_area_per_trip_sqft,
            reference_application_rate_per_trip: self.reference_application_rate_per_trip,
            overtime_hourly_charge: self.overtime_hourly_charge,
        }
    }

    pub fn pricing_request(&self) -> PricingRequest {
        PricingRequest {
            mobilization_cost: self.mobilization_cost,
            misc_rate_pct: self.misc_rate_pct,
            markup_rate_pct: self.markup_rate_pct,
            final_cure_price_per_5gal: self.final_cure_price_per_5gal,
            evap_retarder_price_per_5gal: self.evap_retarder_price_per_5gal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_without_vars_uses_defaults() {
        let config = EstimatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EstimatorConfig::default());
        assert_eq!(config.markup_rate_pct, 40.0);
        assert_eq!(config.final_cure_price_per_5gal, 122.31);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = EstimatorConfig::from_lookup(lookup(&[
            ("DRONECURE_MARKUP_RATE_PCT", "35"),
            ("DRONECURE_COMMUTE_HOURS", " 1.5 "),
        ]))
        .unwrap();
        assert_eq!(config.markup_rate_pct, 35.0);
        assert_eq!(config.commute_hours, 1.5);
        assert_eq!(config.misc_rate_pct, 10.0);
    }

    #[test]
    fn test_from_lookup_blank_keeps_default() {
        let config =
            EstimatorConfig::from_lookup(lookup(&[("DRONECURE_MOBILIZATION_COST", "  ")])).unwrap();
        assert_eq!(config.mobilization_cost, 100.0);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = EstimatorConfig::from_lookup(lookup(&[("DRONECURE_MISC_RATE_PCT", "ten")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("DRONECURE_MISC_RATE_PCT"));
    }

    #[test]
    fn test_section_requests_carry_config_values() {
        let config = EstimatorConfig::default();
        let labor = config.labor_request(Some(4.0));
        assert_eq!(labor.base_wage_per_hour, 30.0);
        assert_eq!(labor.actual_work_hours, Some(4.0));
        assert_eq!(config.drone_request().avg_area_per_trip_sqft, 4500.0);
        assert_eq!(config.pricing_request().evap_retarder_price_per_5gal, 21.87);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let json = serde_json::to_string(&EstimatorConfig::default()).unwrap();
        let back: EstimatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EstimatorConfig::default());
    }
}
