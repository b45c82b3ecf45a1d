//! Validated input records for the estimation engine.
//!
//! These are built once per request by [`super::requests::EstimateRequest::validate`]
//! and passed by reference through every pipeline stage. Nothing here is mutated
//! after construction.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Curing compound applied by the drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    #[default]
    #[serde(alias = "Final Cure", alias = "final-cure")]
    FinalCure,
    #[serde(alias = "Evaporation Retarder", alias = "evaporation-retarder")]
    EvaporationRetarder,
}

impl MaterialType {
    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::FinalCure => "Final Cure",
            MaterialType::EvaporationRetarder => "Evaporation Retarder",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "final-cure" => Ok(MaterialType::FinalCure),
            "evaporation-retarder" | "evap-retarder" => Ok(MaterialType::EvaporationRetarder),
            _ => Err(format!(
                "unknown material {:?} (expected final-cure or evaporation-retarder)",
                s
            )),
        }
    }
}

/// Preset crew wage tiers offered when quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WageTier {
    #[default]
    EntryLevelSkilled,
    JuniorSkilled,
    SeniorSkilled,
    EntryUnskilled,
    JuniorUnskilled,
    SeniorUnskilled,
}

impl WageTier {
    pub const ALL: [WageTier; 6] = [
        WageTier::EntryLevelSkilled,
        WageTier::JuniorSkilled,
        WageTier::SeniorSkilled,
        WageTier::EntryUnskilled,
        WageTier::JuniorUnskilled,
        WageTier::SeniorUnskilled,
    ];

    /// Base hourly wage before payroll and overhead loading.
    pub fn hourly_rate(&self) -> Decimal {
        match self {
            WageTier::EntryLevelSkilled => dec!(30),
            WageTier::JuniorSkilled => dec!(35),
            WageTier::SeniorSkilled => dec!(40),
            WageTier::EntryUnskilled => dec!(15),
            WageTier::JuniorUnskilled => dec!(18),
            WageTier::SeniorUnskilled => dec!(22),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WageTier::EntryLevelSkilled => "Entry-Level Skilled",
            WageTier::JuniorSkilled => "Junior Skilled",
            WageTier::SeniorSkilled => "Senior Skilled",
            WageTier::EntryUnskilled => "Entry Unskilled",
            WageTier::JuniorUnskilled => "Junior Unskilled",
            WageTier::SeniorUnskilled => "Senior Unskilled",
        }
    }
}

impl fmt::Display for WageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (${}/hr)", self.label(), self.hourly_rate())
    }
}

impl FromStr for WageTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        WageTier::ALL
            .into_iter()
            .find(|tier| normalize_key(tier.label()) == key)
            .ok_or_else(|| {
                format!(
                    "unknown wage tier {:?} (expected one of: entry-level-skilled, junior-skilled, \
                     senior-skilled, entry-unskilled, junior-unskilled, senior-unskilled)",
                    s
                )
            })
    }
}

fn normalize_key(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .replace([' ', '_'], "-")
}

/// Format used when displaying a job date.
pub const JOB_DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a job date written either as `MM/DD/YYYY` or ISO `YYYY-MM-DD`.
pub fn parse_job_date(s: &str) -> Result<NaiveDate, String> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, JOB_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|_| format!("unrecognized date {:?} (expected MM/DD/YYYY or YYYY-MM-DD)", s))
}

/// Serde adapter for optional job dates; blank strings read as no date.
pub mod job_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_job_date, JOB_DATE_FORMAT};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(JOB_DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_job_date(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Customer-facing job identification. Display only, never priced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, with = "job_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

impl JobDetails {
    /// Date as shown on estimates, empty when not set.
    pub fn display_date(&self) -> String {
        self.date
            .map(|d| d.format(JOB_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

/// The placement being cured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSpec {
    pub size_sqft: Decimal,
    pub application_rate_sqft_per_gal: Decimal,
    pub material_type: MaterialType,
}

/// Crew cost inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborConfig {
    pub base_wage_per_hour: Decimal,
    pub hourly_power_cost: Decimal,
    pub commute_hours: Decimal,
    /// Hours actually worked, when known. `None` bills the flat-fee hours.
    pub actual_work_hours: Option<Decimal>,
}

/// Nominal throughput of one drone, used to size a job into trips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroneOpsConfig {
    pub avg_minutes_per_trip: Decimal,
    pub avg_area_per_trip_sqft: Decimal,
    /// Application rate (sqft/gal) at which `avg_area_per_trip_sqft` was measured.
    pub reference_application_rate_per_trip: Decimal,
    pub overtime_hourly_charge: Decimal,
}

/// Business rates and material prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingConfig {
    pub mobilization_cost: Decimal,
    pub misc_rate_pct: Decimal,
    pub markup_rate_pct: Decimal,
    pub final_cure_price_per_5gal: Decimal,
    pub evap_retarder_price_per_5gal: Decimal,
}

impl PricingConfig {
    pub fn price_per_5gal(&self, material: MaterialType) -> Decimal {
        match material {
            MaterialType::FinalCure => self.final_cure_price_per_5gal,
            MaterialType::EvaporationRetarder => self.evap_retarder_price_per_5gal,
        }
    }
}

/// Complete, validated snapshot of one estimate request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateInput {
    pub details: JobDetails,
    pub job: JobSpec,
    pub labor: LaborConfig,
    pub drone: DroneOpsConfig,
    pub pricing: PricingConfig,
}
