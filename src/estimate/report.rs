//! Human-readable renderings of an estimate.
//!
//! Full precision is kept in [`EstimateResult`]; rounding happens here and
//! nowhere else.

use std::fmt::Write as _;

use askama::Template;
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::round_money;
use super::models::EstimateInput;
use super::responses::EstimateResponse;
use super::services::EstimateResult;

/// Output produced for a computed estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Full breakdown, one field per line.
    #[default]
    Text,
    /// Breakdown and summary as JSON.
    Json,
    /// Customer summary table as HTML.
    Html,
}

/// Render an estimate in the requested format.
pub fn render_report(
    input: &EstimateInput,
    result: &EstimateResult,
    format: ReportFormat,
) -> crate::Result<String> {
    let rendered = match format {
        ReportFormat::Text => render_text(input, result),
        ReportFormat::Json => {
            serde_json::to_string_pretty(&EstimateResponse::new(input, result))?
        }
        ReportFormat::Html => render_summary_html(&EstimateSummary::new(input, result))?,
    };
    Ok(rendered)
}

/// Render every field of an estimate as plain text, one per line.
pub fn render_text(input: &EstimateInput, result: &EstimateResult) -> String {
    let details = &input.details;
    let mut out = String::new();

    // Writing to a String never fails.
    let _ = writeln!(out, "Job Name: {}", details.job_name);
    let _ = writeln!(out, "Address: {}", details.address);
    let _ = writeln!(out, "Date: {}", details.display_date());
    if let Some(email) = &details.customer_email {
        let _ = writeln!(out, "Customer Email: {}", email);
    }
    let _ = writeln!(out, "Size of Project: {} sqft", input.job.size_sqft.normalize());
    let _ = writeln!(out, "Needed Drone Trips: {}", result.needed_trips.normalize());
    let _ = writeln!(out, "Flat-Fee Hours: {} hrs", fixed(result.flat_fee_hours, 2));
    let _ = writeln!(out, "Actual Work Hours: {} hrs", fixed(result.used_actual_hours, 2));
    let _ = writeln!(out, "Overtime (hrs): {}", fixed(result.overtime_hours, 2));
    let _ = writeln!(out, "Total Work Hours: {} hrs", fixed(result.total_work_hours, 2));
    let _ = writeln!(out, "Material Cost: ${}", fixed(result.material_cost, 2));
    let _ = writeln!(out, "Total Labor Cost: ${}", fixed(result.total_labor_cost, 2));
    let _ = writeln!(out, "Overtime Cost: ${}", fixed(result.overtime_cost, 2));
    let _ = writeln!(out, "Mobilization Cost: ${}", fixed(result.mobilization_cost, 2));
    let _ = writeln!(out, "Miscellaneous Cost: ${}", fixed(result.misc_cost, 2));
    let _ = writeln!(out, "Markup: ${}", fixed(result.markup, 2));
    let _ = writeln!(out, "Total Cost: ${}", fixed(result.total_cost, 2));
    let _ = writeln!(out, "Total Unit Cost: ${}", fixed(result.total_unit_cost, 2));
    let _ = writeln!(out, "User Cost: ${}", fixed(result.user_cost, 2));

    out
}

/// Rounded subset of an estimate sent to the customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateSummary {
    pub job_name: String,
    pub address: String,
    pub date: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub overtime_hourly_charge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub overtime_hours: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub overtime_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_unit_cost: Decimal,
    /// Whole square feet.
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub user_cost: Decimal,
    /// Whole hours.
    #[serde(with = "rust_decimal::serde::str")]
    pub flat_fee_hours: Decimal,
}

impl EstimateSummary {
    pub fn new(input: &EstimateInput, result: &EstimateResult) -> Self {
        Self {
            job_name: input.details.job_name.clone(),
            address: input.details.address.clone(),
            date: input.details.display_date(),
            overtime_hourly_charge: round_money(input.drone.overtime_hourly_charge, 2),
            overtime_hours: round_money(result.overtime_hours, 2),
            overtime_cost: round_money(result.overtime_cost, 2),
            total_unit_cost: round_money(result.total_unit_cost, 2),
            size: round_money(input.job.size_sqft, 0),
            user_cost: round_money(result.user_cost, 2),
            flat_fee_hours: round_money(result.flat_fee_hours, 0),
        }
    }
}

/// Customer summary email body
#[derive(Template)]
#[template(path = "estimate/summary.html")]
struct SummaryEmailTemplate {
    job_name: String,
    address: String,
    date: String,
    overtime_hourly_charge: String,
    overtime_hours: String,
    overtime_cost: String,
    total_unit_cost: String,
    size: String,
    user_cost: String,
    flat_fee_hours: String,
}

/// Render the summary as an HTML table for the mail composer.
///
/// Size and user cost are shown as whole numbers with thousands separators.
pub fn render_summary_html(summary: &EstimateSummary) -> Result<String, askama::Error> {
    let template = SummaryEmailTemplate {
        job_name: summary.job_name.clone(),
        address: summary.address.clone(),
        date: summary.date.clone(),
        overtime_hourly_charge: fixed(summary.overtime_hourly_charge, 2),
        overtime_hours: fixed(summary.overtime_hours, 2),
        overtime_cost: fixed(summary.overtime_cost, 2),
        total_unit_cost: fixed(summary.total_unit_cost, 2),
        size: format_thousands(summary.size),
        user_cost: format_thousands(summary.user_cost),
        flat_fee_hours: fixed(summary.flat_fee_hours, 0),
    };

    template.render()
}

/// Round and pad to exactly `places` decimals.
fn fixed(amount: Decimal, places: u32) -> String {
    let rounded = round_money(amount, places);
    format!("{:.*}", places as usize, rounded)
}

/// Whole-number formatting with `,` thousands separators.
pub fn format_thousands(amount: Decimal) -> String {
    let rounded = round_money(amount, 0);
    let digits = format!("{:.0}", rounded.abs());

    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let grouped: String = result.chars().rev().collect();

    if rounded < Decimal::ZERO {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
