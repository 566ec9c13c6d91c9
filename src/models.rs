use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Seed values for a freshly created day
pub mod defaults {
    pub const BMI: f64 = 23.5;
    pub const SYSTOLIC: u16 = 120;
    pub const DIASTOLIC: u16 = 80;
    pub const BLOOD_SUGAR: u32 = 95;
    pub const STEPS: u32 = 5420;
    pub const SLEEP: f64 = 3.0;
    pub const WEIGHT: f64 = 165.0;
    /// 60% of the default 80 oz goal
    pub const WATER: u32 = 48;
    /// 76% of the default 2200 kcal goal
    pub const CALORIES: u32 = 1680;
    pub const ACTIVITY: u32 = 68;
}

/// Systolic/diastolic pair, stored as text ("120/80")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl BloodPressure {
    pub fn new(systolic: u16, diastolic: u16) -> Self {
        Self { systolic, diastolic }
    }
}

impl Default for BloodPressure {
    fn default() -> Self {
        Self::new(defaults::SYSTOLIC, defaults::DIASTOLIC)
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

impl FromStr for BloodPressure {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = ValidationError::Invalid { field: "blood pressure" };
        let (sys, dia) = s.trim().split_once('/').ok_or(invalid.clone())?;
        let systolic = sys.trim().parse::<u16>().map_err(|_| invalid.clone())?;
        let diastolic = dia.trim().parse::<u16>().map_err(|_| invalid)?;
        Ok(Self { systolic, diastolic })
    }
}

impl TryFrom<String> for BloodPressure {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodPressure> for String {
    fn from(bp: BloodPressure) -> Self {
        bp.to_string()
    }
}

/// One calendar day's health snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    /// Calendar date, unique per day
    pub date: NaiveDate,

    /// Body mass index snapshot
    pub bmi: f64,

    /// Blood pressure reading
    pub blood_pressure: BloodPressure,

    /// Blood sugar in mg/dL
    pub blood_sugar: u32,

    /// Step count
    pub steps: u32,

    /// Sleep in hours
    pub sleep: f64,

    /// Body weight in lbs
    pub weight: f64,

    /// Water intake in oz
    pub water: u32,

    /// Calorie intake in kcal
    pub calories: u32,

    /// Activity level as a percentage (may exceed 100)
    pub activity: u32,
}

impl DaySummary {
    /// A fresh day populated with the default seed values
    pub fn fresh(date: NaiveDate) -> Self {
        Self {
            date,
            bmi: defaults::BMI,
            blood_pressure: BloodPressure::default(),
            blood_sugar: defaults::BLOOD_SUGAR,
            steps: defaults::STEPS,
            sleep: defaults::SLEEP,
            weight: defaults::WEIGHT,
            water: defaults::WATER,
            calories: defaults::CALORIES,
            activity: defaults::ACTIVITY,
        }
    }

    /// Apply every set field of a patch
    pub fn apply(&mut self, patch: &DayPatch) {
        if let Some(v) = patch.bmi {
            self.bmi = v;
        }
        if let Some(v) = patch.blood_pressure {
            self.blood_pressure = v;
        }
        if let Some(v) = patch.blood_sugar {
            self.blood_sugar = v;
        }
        if let Some(v) = patch.steps {
            self.steps = v;
        }
        if let Some(v) = patch.sleep {
            self.sleep = v;
        }
        if let Some(v) = patch.weight {
            self.weight = v;
        }
        if let Some(v) = patch.water {
            self.water = v;
        }
        if let Some(v) = patch.calories {
            self.calories = v;
        }
        if let Some(v) = patch.activity {
            self.activity = v;
        }
    }
}

/// Partial update to the current day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayPatch {
    pub bmi: Option<f64>,
    pub blood_pressure: Option<BloodPressure>,
    pub blood_sugar: Option<u32>,
    pub steps: Option<u32>,
    pub sleep: Option<f64>,
    pub weight: Option<f64>,
    pub water: Option<u32>,
    pub calories: Option<u32>,
    pub activity: Option<u32>,
}

impl DayPatch {
    pub fn is_empty(&self) -> bool {
        *self == DayPatch::default()
    }
}

/// Persisted metrics document: the current day plus archived days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsState {
    pub today: DaySummary,

    /// Most recent first, excludes today
    #[serde(default)]
    pub history: Vec<DaySummary>,
}

impl MetricsState {
    pub fn fresh(date: NaiveDate) -> Self {
        Self {
            today: DaySummary::fresh(date),
            history: Vec::new(),
        }
    }

    /// Today followed by history, newest first
    pub fn days(&self) -> impl Iterator<Item = &DaySummary> {
        std::iter::once(&self.today).chain(self.history.iter())
    }
}

/// Individually settable fields of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    Bmi,
    BloodPressure,
    BloodSugar,
    Steps,
    Sleep,
    Weight,
    Water,
    Calories,
    Activity,
}

impl MetricField {
    pub const ALL: [MetricField; 9] = [
        MetricField::Bmi,
        MetricField::BloodPressure,
        MetricField::BloodSugar,
        MetricField::Steps,
        MetricField::Sleep,
        MetricField::Weight,
        MetricField::Water,
        MetricField::Calories,
        MetricField::Activity,
    ];

    /// Parse a raw input string into a single-field patch
    pub fn parse_patch(&self, raw: &str) -> Result<DayPatch, ValidationError> {
        let raw = raw.trim();
        let field = self.label();
        let mut patch = DayPatch::default();
        match self {
            MetricField::BloodPressure => patch.blood_pressure = Some(raw.parse()?),
            MetricField::Bmi => patch.bmi = Some(parse_non_negative_f64(raw, field)?),
            MetricField::Sleep => patch.sleep = Some(parse_non_negative_f64(raw, field)?),
            MetricField::Weight => patch.weight = Some(parse_non_negative_f64(raw, field)?),
            MetricField::BloodSugar => patch.blood_sugar = Some(parse_u32(raw, field)?),
            MetricField::Steps => patch.steps = Some(parse_u32(raw, field)?),
            MetricField::Water => patch.water = Some(parse_u32(raw, field)?),
            MetricField::Calories => patch.calories = Some(parse_u32(raw, field)?),
            MetricField::Activity => patch.activity = Some(parse_u32(raw, field)?),
        }
        Ok(patch)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricField::Bmi => "bmi",
            MetricField::BloodPressure => "blood pressure",
            MetricField::BloodSugar => "blood sugar",
            MetricField::Steps => "steps",
            MetricField::Sleep => "sleep",
            MetricField::Weight => "weight",
            MetricField::Water => "water",
            MetricField::Calories => "calories",
            MetricField::Activity => "activity",
        }
    }
}

impl FromStr for MetricField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "bmi" => Ok(MetricField::Bmi),
            "bloodpressure" | "bp" => Ok(MetricField::BloodPressure),
            "bloodsugar" => Ok(MetricField::BloodSugar),
            "steps" => Ok(MetricField::Steps),
            "sleep" => Ok(MetricField::Sleep),
            "weight" => Ok(MetricField::Weight),
            "water" => Ok(MetricField::Water),
            "calories" => Ok(MetricField::Calories),
            "activity" => Ok(MetricField::Activity),
            _ => Err(ValidationError::UnknownField(s.to_string())),
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn parse_u32(raw: &str, field: &'static str) -> Result<u32, ValidationError> {
    raw.parse::<u32>()
        .map_err(|_| ValidationError::Invalid { field })
}

fn parse_non_negative_f64(raw: &str, field: &'static str) -> Result<f64, ValidationError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ValidationError::Invalid { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fresh_day_defaults() {
        let day = DaySummary::fresh(date(2024, 3, 1));
        assert_eq!(day.steps, 5420);
        assert_eq!(day.water, 48);
        assert_eq!(day.calories, 1680);
        assert_eq!(day.blood_pressure.to_string(), "120/80");
    }

    #[test]
    fn test_day_summary_wire_format() {
        let day = DaySummary::fresh(date(2024, 3, 1));
        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["bloodPressure"], "120/80");
        assert_eq!(json["bloodSugar"], 95);

        let back: DaySummary = serde_json::from_value(json).unwrap();
        assert_eq!(back, day);
    }

    #[test]
    fn test_blood_pressure_parsing() {
        let bp: BloodPressure = " 135 / 85 ".parse().unwrap();
        assert_eq!(bp, BloodPressure::new(135, 85));
        assert!("135-85".parse::<BloodPressure>().is_err());
        assert!("abc/85".parse::<BloodPressure>().is_err());
    }

    #[test]
    fn test_metric_field_parse_patch() {
        let field: MetricField = "blood-pressure".parse().unwrap();
        let patch = field.parse_patch("118/76").unwrap();
        assert_eq!(patch.blood_pressure, Some(BloodPressure::new(118, 76)));

        let field: MetricField = "sleep".parse().unwrap();
        assert_eq!(field.parse_patch("7.5").unwrap().sleep, Some(7.5));
        assert!(field.parse_patch("-1").is_err());

        assert!("pulse".parse::<MetricField>().is_err());
    }

    #[test]
    fn test_apply_patch_only_touches_set_fields() {
        let mut day = DaySummary::fresh(date(2024, 3, 1));
        day.apply(&DayPatch {
            steps: Some(100),
            ..Default::default()
        });
        assert_eq!(day.steps, 100);
        assert_eq!(day.water, 48);
    }
}
