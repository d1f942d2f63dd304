use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::grid::{CellKey, Week};

// --- Theme ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => bail!("Invalid theme '{s}'. Use 'light' or 'dark'"),
        }
    }
}

// --- BMI ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiRecord {
    pub value: f64,
    pub category: BmiCategory,
    pub date: String,
    /// Height in centimeters.
    #[serde(deserialize_with = "lenient_f64")]
    pub height: f64,
    /// Weight in kilograms.
    #[serde(deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub photo: Option<String>,
}

// --- Goals ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fitt {
    pub frequency: String,
    pub intensity: String,
    pub time: String,
    #[serde(rename = "type", default)]
    pub exercise_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub specific: String,
    pub measurable: String,
    pub achievable: String,
    pub relevant: String,
    pub fitt: Fitt,
    #[serde(default)]
    pub date: String,
}

// --- Activities ---

pub const MIN_ENERGY: u8 = 1;
pub const MAX_ENERGY: u8 = 5;

/// Self-reported energy on a 1-5 star scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "LenientU8", into = "u8")]
pub struct EnergyLevel(u8);

impl EnergyLevel {
    pub fn new(level: u8) -> Result<Self> {
        if !(MIN_ENERGY..=MAX_ENERGY).contains(&level) {
            bail!("Energy level must be between {MIN_ENERGY} and {MAX_ENERGY} (got {level})");
        }
        Ok(Self(level))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn stars(self) -> String {
        "★".repeat(usize::from(self.0))
    }
}

impl Default for EnergyLevel {
    fn default() -> Self {
        Self(3)
    }
}

impl From<EnergyLevel> for u8 {
    fn from(level: EnergyLevel) -> Self {
        level.0
    }
}

impl TryFrom<LenientU8> for EnergyLevel {
    type Error = anyhow::Error;

    fn try_from(value: LenientU8) -> Result<Self> {
        Self::new(value.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub details: String,
    pub energy: EnergyLevel,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub photo: Option<String>,
}

pub type ActivityMap = BTreeMap<CellKey, ActivityRecord>;

// --- Food ---

pub const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner", "snack"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(deserialize_with = "missing_as_zero", default)]
    pub protein: f64,
    #[serde(deserialize_with = "missing_as_zero", default)]
    pub carbs: f64,
    #[serde(deserialize_with = "missing_as_zero", default)]
    pub fat: f64,
    #[serde(deserialize_with = "missing_as_zero", default)]
    pub calories: f64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub photo: Option<String>,
}

/// `date -> meal -> entries`, entries kept in insertion order.
pub type FoodLog = BTreeMap<NaiveDate, BTreeMap<String, Vec<FoodEntry>>>;

pub fn validate_meal_type(meal: &str) -> Result<String> {
    let lower = meal.trim().to_lowercase();
    if MEAL_TYPES.contains(&lower.as_str()) {
        Ok(lower)
    } else {
        bail!(
            "Invalid meal type '{meal}'. Must be one of: {}",
            MEAL_TYPES.join(", ")
        )
    }
}

// --- Gallery ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryKind {
    Bmi,
    Workout,
    Food,
}

impl GalleryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bmi => "bmi",
            Self::Workout => "workout",
            Self::Food => "food",
        }
    }
}

impl fmt::Display for GalleryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GalleryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bmi" => Ok(Self::Bmi),
            "workout" => Ok(Self::Workout),
            "food" => Ok(Self::Food),
            _ => bail!("Invalid gallery type '{s}'. Use bmi, workout, or food"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    #[serde(rename = "type")]
    pub kind: GalleryKind,
    pub photo: String,
    pub description: String,
    pub date: String,
    pub week: Week,
}

// --- Export / Import ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub bmi: Option<BmiRecord>,
    #[serde(default)]
    pub goals: Option<GoalRecord>,
    #[serde(default)]
    pub activities: Option<ActivityMap>,
    #[serde(rename = "foodLog", default)]
    pub food_log: Option<FoodLog>,
    #[serde(default)]
    pub gallery: Option<Vec<GalleryItem>>,
    #[serde(rename = "exportDate")]
    pub export_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub theme: bool,
    pub bmi: bool,
    pub goals: bool,
    pub activities: usize,
    pub food_entries: usize,
    pub gallery_items: usize,
}

/// Current UTC time in the millisecond ISO-8601 form used for every stored timestamp.
#[must_use]
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Browser-era exports stored form fields as strings ("175", "3") and wrote
// unparsed macros as null.

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_f64()
}

fn missing_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(value) => value.into_f64(),
        None => {
            tracing::warn!("food entry has a null macro value, reading it as 0");
            Ok(0.0)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LenientU8(u8);

impl<'de> Deserialize<'de> for LenientU8 {
    #[allow(clippy::cast_sign_loss)]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = NumberOrString::deserialize(deserializer)?.into_f64::<D::Error>()?;
        if n.fract() != 0.0 || !(0.0..=255.0).contains(&n) {
            return Err(serde::de::Error::custom(format!("expected a small integer, got {n}")));
        }
        Ok(Self(n as u8))
    }
}
