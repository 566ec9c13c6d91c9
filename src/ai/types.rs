use serde::{Deserialize, Serialize};
use std::fmt;

use crate::journal::MealType;

/// Suggested meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecommendation {
    pub name: String,
    pub category: MealType,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub reason: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Minutes
    #[serde(default)]
    pub prep_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

impl fmt::Display for InsightPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightPriority::High => write!(f, "high"),
            InsightPriority::Medium => write!(f, "medium"),
            InsightPriority::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsight {
    pub title: String,
    pub insight: String,
    pub recommendation: String,
    pub priority: InsightPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl std::str::FromStr for Difficulty {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(crate::error::ValidationError::Invalid {
                field: "difficulty",
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

/// One exercise in a plan. Cardio items use `duration`, strength items use
/// `sets`/`reps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub name: String,
    /// Minutes
    pub duration: u32,
    pub exercises: Vec<PlannedExercise>,
    pub calories_burned: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub focus: String,
}

/// Inputs for workout plan generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutPreferences {
    pub duration: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub focus: Option<String>,
    pub equipment: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealPreferences {
    pub dietary_restrictions: Vec<String>,
    pub favorite_foods: Vec<String>,
}

/// Partially typed address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSuggestion {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub full_address: String,
}

impl AddressSuggestion {
    /// Compose `full_address` from the parts when the model left it empty
    pub fn with_full_address(mut self) -> Self {
        if self.full_address.trim().is_empty() {
            self.full_address = format!(
                "{}, {}, {} {}",
                self.street, self.city, self.state, self.zip
            );
        }
        self
    }
}
