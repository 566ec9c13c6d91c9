//! Day-history export
//!
//! Two flat projections of `[today, ...history]`: a nutrition-oriented
//! "meal log" and an activity-oriented "exercise log", written as JSON or CSV.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::error::ExportError;
use crate::models::{DaySummary, MetricsState};

pub mod csv;
pub mod json;

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Which projection to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Meals,
    Exercise,
}

impl ExportKind {
    pub fn file_stem(&self) -> &'static str {
        match self {
            ExportKind::Meals => "meal-log",
            ExportKind::Exercise => "exercise-log",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for ExportKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "meal" | "meals" | "meal-log" => Ok(ExportKind::Meals),
            "exercise" | "exercises" | "exercise-log" => Ok(ExportKind::Exercise),
            _ => Err(ExportError::UnsupportedKind(s.to_string())),
        }
    }
}

/// Nutrition-oriented row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealLogRow {
    pub date: NaiveDate,
    pub calories: u32,
    pub water: u32,
    pub weight: f64,
    pub bmi: f64,
}

impl From<&DaySummary> for MealLogRow {
    fn from(day: &DaySummary) -> Self {
        Self {
            date: day.date,
            calories: day.calories,
            water: day.water,
            weight: day.weight,
            bmi: day.bmi,
        }
    }
}

/// Activity-oriented row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseLogRow {
    pub date: NaiveDate,
    pub steps: u32,
    pub activity: u32,
    pub sleep: f64,
    pub weight: f64,
    pub bmi: f64,
}

impl From<&DaySummary> for ExerciseLogRow {
    fn from(day: &DaySummary) -> Self {
        Self {
            date: day.date,
            steps: day.steps,
            activity: day.activity,
            sleep: day.sleep,
            weight: day.weight,
            bmi: day.bmi,
        }
    }
}

pub fn meal_rows(state: &MetricsState) -> Vec<MealLogRow> {
    state.days().map(MealLogRow::from).collect()
}

pub fn exercise_rows(state: &MetricsState) -> Vec<ExerciseLogRow> {
    state.days().map(ExerciseLogRow::from).collect()
}

/// `meal-log-2024-05-01.json` style name, dated by the export day
pub fn file_name(kind: ExportKind, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}-{}.{}",
        kind.file_stem(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Write one projection of the metrics into `output_dir`; returns the path
pub fn export_history(
    state: &MetricsState,
    kind: ExportKind,
    format: ExportFormat,
    output_dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ExportError::WriteFailed {
        path: output_dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    let path = output_dir.join(file_name(kind, format, date));

    match (kind, format) {
        (ExportKind::Meals, ExportFormat::Json) => json::export_json(&meal_rows(state), &path)?,
        (ExportKind::Meals, ExportFormat::Csv) => csv::export_rows(&meal_rows(state), &path)?,
        (ExportKind::Exercise, ExportFormat::Json) => {
            json::export_json(&exercise_rows(state), &path)?
        }
        (ExportKind::Exercise, ExportFormat::Csv) => {
            csv::export_rows(&exercise_rows(state), &path)?
        }
    }

    info!(kind = %kind, path = %path.display(), "Exported history");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn state() -> MetricsState {
        let today = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let mut state = MetricsState::fresh(today);
        let mut yesterday = DaySummary::fresh(today.pred_opt().unwrap());
        yesterday.calories = 2500;
        yesterday.steps = 11_000;
        state.history.push(yesterday);
        state
    }

    #[test]
    fn test_projections_cover_today_and_history() {
        let rows = meal_rows(&state());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].calories, 1680);
        assert_eq!(rows[1].calories, 2500);

        let rows = exercise_rows(&state());
        assert_eq!(rows[1].steps, 11_000);
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(
            file_name(ExportKind::Meals, ExportFormat::Json, date),
            "meal-log-2024-09-02.json"
        );
        assert_eq!(
            file_name(ExportKind::Exercise, ExportFormat::Csv, date),
            "exercise-log-2024-09-02.csv"
        );
    }

    #[test]
    fn test_export_json_file() {
        let dir = tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let path = export_history(&state(), ExportKind::Meals, ExportFormat::Json, dir.path(), date)
            .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(rows[0]["date"], "2024-09-02");
        assert_eq!(rows[1]["calories"], 2500);
        assert!(rows[0].get("steps").is_none());
    }

    #[test]
    fn test_export_csv_file() {
        let dir = tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let path = export_history(
            &state(),
            ExportKind::Exercise,
            ExportFormat::Csv,
            &dir.path().join("nested"),
            date,
        )
        .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("date,steps,activity,sleep,weight,bmi"));
        assert_eq!(lines.next(), Some("2024-09-02,5420,68,3.0,165.0,23.5"));
    }

    #[test]
    fn test_parse_kind_and_format() {
        assert_eq!("meals".parse::<ExportKind>().unwrap(), ExportKind::Meals);
        assert!("sleep".parse::<ExportKind>().is_err());
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
