//! Daily goals and close-of-day evaluation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StorageError;
use crate::models::DaySummary;
use crate::storage::{self, keys, KeyValueStore};

/// Ratio at or above which a goal counts as met
pub const MET_RATIO: f64 = 1.0;

/// Ratio below which a goal counts as far off
pub const FAR_RATIO: f64 = 0.5;

/// Daily targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub steps: u32,

    /// Water in oz
    pub water: u32,

    /// Sleep in hours
    pub sleep: f64,

    /// Calories in kcal
    pub calories: u32,
}

impl Default for DailyGoals {
    fn default() -> Self {
        Self {
            steps: 8000,
            water: 80,
            sleep: 7.5,
            calories: 2200,
        }
    }
}

impl DailyGoals {
    pub fn merge(&mut self, patch: &GoalsPatch) {
        if let Some(v) = patch.steps {
            self.steps = v;
        }
        if let Some(v) = patch.water {
            self.water = v;
        }
        if let Some(v) = patch.sleep {
            self.sleep = v;
        }
        if let Some(v) = patch.calories {
            self.calories = v;
        }
    }
}

/// Partial goal update; also the shape of a partially persisted document
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalsPatch {
    pub steps: Option<u32>,
    pub water: Option<u32>,
    pub sleep: Option<f64>,
    pub calories: Option<u32>,
}

impl GoalsPatch {
    pub fn is_empty(&self) -> bool {
        *self == GoalsPatch::default()
    }
}

impl From<DailyGoals> for GoalsPatch {
    fn from(goals: DailyGoals) -> Self {
        Self {
            steps: Some(goals.steps),
            water: Some(goals.water),
            sleep: Some(goals.sleep),
            calories: Some(goals.calories),
        }
    }
}

/// Goals state, loaded once and persisted after every change
#[derive(Debug, Clone, Default)]
pub struct GoalStore {
    goals: DailyGoals,
}

impl GoalStore {
    /// Load persisted goals merged over the defaults
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let mut goals = DailyGoals::default();
        if let Some(patch) = storage::load_json::<GoalsPatch>(store, keys::GOALS)? {
            goals.merge(&patch);
        }
        Ok(Self { goals })
    }

    pub fn goals(&self) -> &DailyGoals {
        &self.goals
    }

    /// Merge a patch and persist the full goal set
    pub fn update(&mut self, patch: &GoalsPatch, store: &mut dyn KeyValueStore) -> DailyGoals {
        self.goals.merge(patch);
        storage::persist_best_effort(store, keys::GOALS, &self.goals);
        self.goals
    }
}

/// `actual / goal`, or 0 when the goal is 0
pub fn goal_ratio(actual: f64, goal: f64) -> f64 {
    if goal == 0.0 {
        0.0
    } else {
        actual / goal
    }
}

/// Ratios for steps, water, sleep and calories, in that order
pub fn goal_ratios(day: &DaySummary, goals: &DailyGoals) -> [f64; 4] {
    [
        goal_ratio(f64::from(day.steps), f64::from(goals.steps)),
        goal_ratio(f64::from(day.water), f64::from(goals.water)),
        goal_ratio(day.sleep, goals.sleep),
        goal_ratio(f64::from(day.calories), f64::from(goals.calories)),
    ]
}

/// Verdict on a closed day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    /// At least three goals met
    Celebrate,
    /// At least two goals under half way
    Refocus,
    NoChange,
}

impl GoalOutcome {
    pub fn title(&self) -> Option<&'static str> {
        match self {
            GoalOutcome::Celebrate => Some("Goals completed 🎉"),
            GoalOutcome::Refocus => Some("Let's refocus"),
            GoalOutcome::NoChange => None,
        }
    }

    pub fn body(&self) -> Option<&'static str> {
        match self {
            GoalOutcome::Celebrate => {
                Some("You hit most of your health goals today. Great work keeping on track!")
            }
            GoalOutcome::Refocus => Some(
                "You were quite far from your goals today. Small changes tomorrow can make a big difference.",
            ),
            GoalOutcome::NoChange => None,
        }
    }
}

impl fmt::Display for GoalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalOutcome::Celebrate => write!(f, "celebrate"),
            GoalOutcome::Refocus => write!(f, "refocus"),
            GoalOutcome::NoChange => write!(f, "no change"),
        }
    }
}

/// Evaluate a day against the goals. Celebration wins over refocus.
pub fn evaluate_day(day: &DaySummary, goals: &DailyGoals) -> GoalOutcome {
    let ratios = goal_ratios(day, goals);
    let met = ratios.iter().filter(|r| **r >= MET_RATIO).count();
    let far = ratios.iter().filter(|r| **r < FAR_RATIO).count();

    if met >= 3 {
        GoalOutcome::Celebrate
    } else if far >= 2 {
        GoalOutcome::Refocus
    } else {
        GoalOutcome::NoChange
    }
}
