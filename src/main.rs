use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use dronecure_estimator::config::EstimatorConfig;
use dronecure_estimator::estimate::models::parse_job_date;
use dronecure_estimator::estimate::requests::{EstimateRequest, JobRequest};
use dronecure_estimator::estimate::responses::EstimateErrorResponse;
use dronecure_estimator::estimate::{
    calculate_estimate, render_report, JobDetails, MaterialType, ReportFormat, WageTier,
};
use rust_decimal::prelude::ToPrimitive;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "dronecure_estimator=info,dronecure=info";

/// Exit status for a request rejected as invalid input.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "dronecure",
    version,
    about = "Price drone application of concrete curing compound."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate a single job.
    Estimate(Box<EstimateArgs>),
    /// Print the effective shop rates as JSON.
    Defaults,
    /// List the preset crew wage tiers.
    WageTiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full breakdown, one field per line.
    Text,
    /// Breakdown and summary as JSON.
    Json,
    /// Customer summary table as HTML.
    Html,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Html => ReportFormat::Html,
        }
    }
}

#[derive(Debug, Parser)]
struct EstimateArgs {
    /// Read a complete estimate request from a JSON file ("-" for stdin).
    #[arg(long, conflicts_with_all = ["size", "application_rate", "material"])]
    input: Option<PathBuf>,

    /// Size of placement (sqft).
    #[arg(long, required_unless_present = "input")]
    size: Option<f64>,

    /// Application rate (sqft per gallon).
    #[arg(long, required_unless_present = "input")]
    application_rate: Option<f64>,

    /// Curing compound: final-cure or evaporation-retarder.
    #[arg(long)]
    material: Option<MaterialType>,

    /// Preset crew wage tier (e.g. senior-skilled).
    #[arg(long, conflicts_with = "base_wage")]
    wage_tier: Option<WageTier>,

    /// Base crew wage ($/hr), instead of a preset tier.
    #[arg(long)]
    base_wage: Option<f64>,

    /// Hours actually worked; omit to bill the flat-fee hours.
    #[arg(long)]
    actual_hours: Option<f64>,

    /// Hourly power cost ($).
    #[arg(long)]
    power_cost: Option<f64>,

    /// Commute hours billed once per job.
    #[arg(long)]
    commute_hours: Option<f64>,

    /// Average time per drone trip (minutes).
    #[arg(long)]
    minutes_per_trip: Option<f64>,

    /// Average covered area per trip (sqft).
    #[arg(long)]
    area_per_trip: Option<f64>,

    /// Application rate the area per trip was measured at (sqft per gallon).
    #[arg(long)]
    reference_rate: Option<f64>,

    /// Overtime hourly charge ($/hr).
    #[arg(long)]
    overtime_charge: Option<f64>,

    /// Mobilization cost ($).
    #[arg(long)]
    mobilization: Option<f64>,

    /// Miscellaneous rate (%).
    #[arg(long)]
    misc_rate: Option<f64>,

    /// Markup rate (%).
    #[arg(long)]
    markup_rate: Option<f64>,

    /// Final Cure price ($ per 5-gallon pail).
    #[arg(long)]
    final_cure_price: Option<f64>,

    /// Evaporation Retarder price ($ per 5-gallon pail).
    #[arg(long)]
    evap_retarder_price: Option<f64>,

    #[arg(long)]
    job_name: Option<String>,

    #[arg(long)]
    address: Option<String>,

    /// Job date, MM/DD/YYYY or YYYY-MM-DD.
    #[arg(long, value_parser = parse_job_date)]
    date: Option<NaiveDate>,

    /// Customer contact, listed in the text and JSON output.
    #[arg(long)]
    customer_email: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EstimatorConfig::from_env().context("load estimator configuration")?;

    match cli.cmd {
        Command::Estimate(args) => cmd_estimate(*args, &config),
        Command::Defaults => cmd_defaults(&config),
        Command::WageTiers => cmd_wage_tiers(),
    }
}

fn cmd_estimate(args: EstimateArgs, config: &EstimatorConfig) -> anyhow::Result<ExitCode> {
    let request = match &args.input {
        Some(path) => read_request(path)?,
        None => request_from_flags(&args, config)?,
    };
    let request = apply_overrides(request, &args);

    let input = match request.validate() {
        Ok(input) => input,
        Err(err) => {
            if args.format == OutputFormat::Json {
                let response = EstimateErrorResponse::from(&err);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                eprintln!("{}", err.user_message());
            }
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
    };

    let result = calculate_estimate(&input)?;

    let report =
        render_report(&input, &result, args.format.into()).context("render estimate")?;
    if report.ends_with('\n') {
        print!("{}", report);
    } else {
        println!("{}", report);
    }

    Ok(ExitCode::SUCCESS)
}

fn read_request(path: &Path) -> anyhow::Result<EstimateRequest> {
    let request = if path == Path::new("-") {
        EstimateRequest::from_reader(std::io::stdin().lock())
            .context("read estimate request from stdin")?
    } else {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        EstimateRequest::from_reader(file)
            .with_context(|| format!("read estimate request {}", path.display()))?
    };
    info!("Loaded estimate request from {}", path.display());
    Ok(request)
}

fn request_from_flags(
    args: &EstimateArgs,
    config: &EstimatorConfig,
) -> anyhow::Result<EstimateRequest> {
    let (Some(size_sqft), Some(application_rate)) = (args.size, args.application_rate) else {
        anyhow::bail!("--size and --application-rate are required without --input");
    };

    Ok(EstimateRequest {
        details: JobDetails::default(),
        job: JobRequest {
            size_sqft,
            application_rate_sqft_per_gal: application_rate,
            material_type: args.material.unwrap_or_default(),
        },
        labor: config.labor_request(None),
        drone: config.drone_request(),
        pricing: config.pricing_request(),
    })
}

/// Command-line values win over the request file and the configured rates.
fn apply_overrides(mut request: EstimateRequest, args: &EstimateArgs) -> EstimateRequest {
    fn set(target: &mut f64, value: Option<f64>) {
        if let Some(v) = value {
            *target = v;
        }
    }

    let wage = args
        .wage_tier
        .and_then(|tier| tier.hourly_rate().to_f64())
        .or(args.base_wage);
    set(&mut request.labor.base_wage_per_hour, wage);
    set(&mut request.labor.hourly_power_cost, args.power_cost);
    set(&mut request.labor.commute_hours, args.commute_hours);
    if args.actual_hours.is_some() {
        request.labor.actual_work_hours = args.actual_hours;
    }

    set(&mut request.drone.avg_minutes_per_trip, args.minutes_per_trip);
    set(&mut request.drone.avg_area_per_trip_sqft, args.area_per_trip);
    set(&mut request.drone.reference_application_rate_per_trip, args.reference_rate);
    set(&mut request.drone.overtime_hourly_charge, args.overtime_charge);

    set(&mut request.pricing.mobilization_cost, args.mobilization);
    set(&mut request.pricing.misc_rate_pct, args.misc_rate);
    set(&mut request.pricing.markup_rate_pct, args.markup_rate);
    set(&mut request.pricing.final_cure_price_per_5gal, args.final_cure_price);
    set(&mut request.pricing.evap_retarder_price_per_5gal, args.evap_retarder_price);

    if let Some(name) = &args.job_name {
        request.details.job_name = name.clone();
    }
    if let Some(address) = &args.address {
        request.details.address = address.clone();
    }
    if args.date.is_some() {
        request.details.date = args.date;
    }
    if args.customer_email.is_some() {
        request.details.customer_email = args.customer_email.clone();
    }

    request
}

fn cmd_defaults(config: &EstimatorConfig) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_wage_tiers() -> anyhow::Result<ExitCode> {
    for tier in WageTier::ALL {
        let key = serde_json::to_value(tier)?;
        println!("{:<22} {}", key.as_str().unwrap_or_default(), tier);
    }
    Ok(ExitCode::SUCCESS)
}
