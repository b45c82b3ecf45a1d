//! Estimator for drone-applied concrete curing compound.
//!
//! Given a job (placement size, application rate, material) and the shop's
//! crew, drone and pricing rates, computes the trips, hours and costs of the
//! job and the price quoted to the customer.
//!
//! ```
//! use dronecure_estimator::config::EstimatorConfig;
//! use dronecure_estimator::estimate::requests::{EstimateRequest, JobRequest};
//! use dronecure_estimator::estimate::{calculate_estimate, round_money, MaterialType};
//! use rust_decimal_macros::dec;
//!
//! let config = EstimatorConfig::default();
//! let request = EstimateRequest {
//!     details: Default::default(),
//!     job: JobRequest {
//!         size_sqft: 5000.0,
//!         application_rate_sqft_per_gal: 400.0,
//!         material_type: MaterialType::FinalCure,
//!     },
//!     labor: config.labor_request(None),
//!     drone: config.drone_request(),
//!     pricing: config.pricing_request(),
//! };
//!
//! let input = request.validate().unwrap();
//! let result = calculate_estimate(&input).unwrap();
//! assert_eq!(result.needed_trips, dec!(5));
//! assert_eq!(round_money(result.user_cost, 2), dec!(815.46));
//! ```

pub mod config;
pub mod error;
pub mod estimate;

pub use error::{AppError, Result};
