//! Estimation engine for drone-applied curing compound.
//!
//! Turns one job (size, application rate, material) plus the crew, drone and
//! pricing rates into a deterministic cost breakdown and customer price.
//! Everything here is synchronous and free of shared state.

pub mod calculators;
pub mod models;
pub mod report;
pub mod requests;
pub mod responses;
pub mod services;

// Re-export commonly used items
pub use calculators::round_money;
pub use models::{
    DroneOpsConfig, EstimateInput, JobDetails, JobSpec, LaborConfig, MaterialType, PricingConfig,
    WageTier,
};
pub use report::{render_report, render_summary_html, render_text, EstimateSummary, ReportFormat};
pub use requests::EstimateRequest;
pub use responses::EstimateResponse;
pub use services::{calculate_estimate, EstimateError, EstimateResult, InvalidReason};
