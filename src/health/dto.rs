use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl FromStr for BloodPressure {
    type Err = WorkflowError;

    /// Accepts the "120/80" text form used by the entry form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref BP_RE: Regex = Regex::new(r"^\s*(\d{2,3})\s*/\s*(\d{2,3})\s*$").unwrap();
        }
        let caps = BP_RE
            .captures(s)
            .ok_or_else(|| WorkflowError::validation("Blood pressure must look like 120/80"))?;
        // Capture groups are all-digit, bounded length; parse cannot fail.
        Ok(Self {
            systolic: caps[1].parse().unwrap(),
            diastolic: caps[2].parse().unwrap(),
        })
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietPreference {
    Vegetarian,
    NonVegetarian,
    Vegan,
    Eggetarian,
    Pescatarian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

/// A single timestamped snapshot of self-reported health/lab data, in the
/// wire shape of `POST /api/health/entries`. Server-assigned ids are opaque
/// Mongo-style strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub entry_date: OffsetDateTime,

    // Demographics
    pub age: Option<u32>,
    /// Height in centimetres.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    /// Derived: weight / (height/100)^2, rounded to one decimal.
    pub bmi: Option<f64>,

    // Medical
    pub trimester: Option<u8>,
    pub hemoglobin: Option<f64>,
    pub blood_sugar: Option<f64>,
    pub blood_pressure: Option<BloodPressure>,

    // Labs
    pub vitamin_d: Option<f64>,
    pub vitamin_b12: Option<f64>,
    pub vitamin_a: Option<f64>,
    pub vitamin_c: Option<f64>,
    pub calcium: Option<f64>,
    pub iron_levels: Option<f64>,

    // Dietary
    pub diet_preference: Option<DietPreference>,
    #[serde(default)]
    pub food_allergies: Vec<String>,
    #[serde(default)]
    pub religious_cultural_restrictions: Vec<String>,

    // Lifestyle
    pub activity_level: Option<ActivityLevel>,
    pub sleep_hours: Option<f64>,
    /// Litres per day.
    pub water_intake: Option<f64>,

    // Special conditions
    #[serde(default)]
    pub is_multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_type: Option<String>,
    #[serde(default)]
    pub is_high_risk: bool,
    #[serde(default)]
    pub current_supplements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Response of `POST /api/health/entries`: the saved entry; only the id is
/// needed downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedHealthEntry {
    #[serde(rename = "_id")]
    pub id: String,
}
