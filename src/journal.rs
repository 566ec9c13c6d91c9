//! Meal and exercise journals
//!
//! Free-standing logs, newest entry first. They are not reconciled into the
//! daily metrics: logging a meal does not change today's calorie count.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StorageError, ValidationError};
use crate::storage::{self, keys, KeyValueStore};
use crate::validation::{require_positive, require_text};

/// Length of the random id suffix
const ID_SUFFIX_LEN: usize = 9;

/// Millisecond timestamp followed by nine random characters
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", now.timestamp_millis(), &suffix[..ID_SUFFIX_LEN])
}

/// Behaviour shared by every journal entry type
pub trait JournalEntry: Clone + Serialize + DeserializeOwned {
    /// Storage key for the whole journal
    const STORAGE_KEY: &'static str;

    fn id(&self) -> &str;
    fn date(&self) -> NaiveDate;
    /// Insertion time in ms since the epoch
    fn timestamp(&self) -> i64;
}

/// Ordered log of entries, newest first
#[derive(Debug, Clone)]
pub struct Journal<T> {
    entries: Vec<T>,
}

impl<T> Default for Journal<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: JournalEntry> Journal<T> {
    /// Load and sort by timestamp, newest first
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let mut entries = storage::load_json::<Vec<T>>(store, T::STORAGE_KEY)?.unwrap_or_default();
        entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp()));
        debug!(key = T::STORAGE_KEY, count = entries.len(), "Journal loaded");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend an entry and persist
    pub fn add(&mut self, entry: T, store: &mut dyn KeyValueStore) -> &T {
        self.entries.insert(0, entry);
        self.persist(store);
        &self.entries[0]
    }

    /// Remove the entry with `id`; returns whether one was removed
    pub fn delete(&mut self, id: &str, store: &mut dyn KeyValueStore) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist(store);
        }
        removed
    }

    pub fn by_date(&self, date: NaiveDate) -> Vec<&T> {
        self.entries.iter().filter(|e| e.date() == date).collect()
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        storage::persist_best_effort(store, T::STORAGE_KEY, &self.entries);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealType::Breakfast => write!(f, "breakfast"),
            MealType::Lunch => write!(f, "lunch"),
            MealType::Dinner => write!(f, "dinner"),
            MealType::Snack => write!(f, "snack"),
        }
    }
}

impl FromStr for MealType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(ValidationError::Invalid { field: "meal type" }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogEntry {
    pub id: String,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: f64,
    /// Grams
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: i64,
}

impl JournalEntry for MealLogEntry {
    const STORAGE_KEY: &'static str = keys::MEAL_LOGS;

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// A meal as entered, before it gets an id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub notes: Option<String>,
}

impl NewMeal {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.food_name, ValidationError::Missing { what: "a food name" })?;
        require_positive(self.calories, ValidationError::Missing { what: "calories" })?;
        Ok(())
    }

    /// Validate and stamp with an id and insertion time
    pub fn into_entry(self, now: DateTime<Utc>) -> Result<MealLogEntry, ValidationError> {
        self.validate()?;
        Ok(MealLogEntry {
            id: generate_id(now),
            date: self.date,
            meal_type: self.meal_type,
            food_name: self.food_name.trim().to_string(),
            calories: self.calories,
            protein: non_negative(self.protein),
            carbs: non_negative(self.carbs),
            fat: non_negative(self.fat),
            notes: clean_notes(self.notes),
            timestamp: now.timestamp_millis(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLogEntry {
    pub id: String,
    pub date: NaiveDate,
    pub exercise_type: String,
    /// Minutes
    pub duration: f64,
    pub calories_burned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: i64,
}

impl JournalEntry for ExerciseLogEntry {
    const STORAGE_KEY: &'static str = keys::EXERCISE_LOGS;

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub date: NaiveDate,
    pub exercise_type: String,
    pub duration: f64,
    pub calories_burned: f64,
    pub notes: Option<String>,
}

impl NewExercise {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(
            &self.exercise_type,
            ValidationError::Missing {
                what: "an exercise type",
            },
        )?;
        require_positive(
            self.duration,
            ValidationError::Missing {
                what: "duration in minutes",
            },
        )?;
        Ok(())
    }

    pub fn into_entry(self, now: DateTime<Utc>) -> Result<ExerciseLogEntry, ValidationError> {
        self.validate()?;
        Ok(ExerciseLogEntry {
            id: generate_id(now),
            date: self.date,
            exercise_type: self.exercise_type.trim().to_string(),
            duration: self.duration,
            calories_burned: non_negative(self.calories_burned),
            notes: clean_notes(self.notes),
            timestamp: now.timestamp_millis(),
        })
    }
}

pub type MealJournal = Journal<MealLogEntry>;
pub type ExerciseJournal = Journal<ExerciseLogEntry>;

impl MealJournal {
    pub fn total_calories(&self, date: NaiveDate) -> f64 {
        self.by_date(date).iter().map(|e| e.calories).sum()
    }
}

/// Per-day exercise totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExerciseTotals {
    pub calories_burned: f64,
    pub duration: f64,
}

impl ExerciseJournal {
    pub fn totals(&self, date: NaiveDate) -> ExerciseTotals {
        self.by_date(date)
            .iter()
            .fold(ExerciseTotals::default(), |acc, e| ExerciseTotals {
                calories_burned: acc.calories_burned + e.calories_burned,
                duration: acc.duration + e.duration,
            })
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 4, 12, 30, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    fn meal(name: &str, calories: f64) -> NewMeal {
        NewMeal {
            date: day(),
            meal_type: MealType::Lunch,
            food_name: name.to_string(),
            calories,
            protein: 20.0,
            carbs: 30.0,
            fat: 10.0,
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_id_format() {
        let id = generate_id(now());
        let millis = now().timestamp_millis().to_string();
        assert!(id.starts_with(&millis));
        assert_eq!(id.len(), millis.len() + 9);
        assert_ne!(generate_id(now()), generate_id(now()));
    }

    #[test]
    fn test_meal_validation() {
        assert_eq!(
            meal(" ", 300.0).validate().unwrap_err().to_string(),
            "Please enter a food name"
        );
        assert_eq!(
            meal("Soup", 0.0).validate().unwrap_err().to_string(),
            "Please enter calories"
        );
        let entry = meal(" Soup ", 300.0).into_entry(now()).unwrap();
        assert_eq!(entry.food_name, "Soup");
        assert!(entry.notes.is_none());
    }

    #[test]
    fn test_exercise_validation() {
        let exercise = NewExercise {
            date: day(),
            exercise_type: "Cycling".to_string(),
            duration: 0.0,
            calories_burned: 100.0,
            notes: None,
        };
        assert_eq!(
            exercise.validate().unwrap_err().to_string(),
            "Please enter duration in minutes"
        );
    }

    #[test]
    fn test_add_delete_filter_and_totals() {
        let mut store = MemoryStore::new();
        let mut journal = MealJournal::load(&store).unwrap();

        let first = meal("Oats", 350.0).into_entry(now()).unwrap();
        let mut second = meal("Salad", 400.0)
            .into_entry(now() + Duration::minutes(5))
            .unwrap();
        second.date = day() - Duration::days(1);
        let first_id = first.id.clone();

        journal.add(first, &mut store);
        journal.add(second, &mut store);
        assert_eq!(journal.entries()[0].food_name, "Salad");
        assert_eq!(journal.by_date(day()).len(), 1);
        assert_eq!(journal.total_calories(day()), 350.0);

        assert!(journal.delete(&first_id, &mut store));
        assert!(!journal.delete("missing", &mut store));
        assert_eq!(MealJournal::load(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_load_sorts_newest_first() {
        let mut store = MemoryStore::new();
        let older = meal("Older", 100.0).into_entry(now()).unwrap();
        let newer = meal("Newer", 100.0)
            .into_entry(now() + Duration::hours(1))
            .unwrap();
        storage::save_json(&mut store, keys::MEAL_LOGS, &vec![older, newer]).unwrap();

        let journal = MealJournal::load(&store).unwrap();
        assert_eq!(journal.entries()[0].food_name, "Newer");
    }

    #[test]
    fn test_exercise_totals() {
        let mut store = MemoryStore::new();
        let mut journal = ExerciseJournal::default();
        for (minutes, kcal) in [(30.0, 250.0), (15.0, 90.0)] {
            let entry = NewExercise {
                date: day(),
                exercise_type: "Running".to_string(),
                duration: minutes,
                calories_burned: kcal,
                notes: None,
            }
            .into_entry(now())
            .unwrap();
            journal.add(entry, &mut store);
        }
        let totals = journal.totals(day());
        assert_eq!(totals.duration, 45.0);
        assert_eq!(totals.calories_burned, 340.0);
        assert_eq!(journal.totals(day() - Duration::days(1)), ExerciseTotals::default());
    }
}
