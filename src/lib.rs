// Library interface for HealthSync modules
// This allows integration tests to access the core functionality

pub mod ai;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod goals;
pub mod insights;
pub mod journal;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod preferences;
pub mod profile;
pub mod rollover;
pub mod storage;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::*;
pub use app::{DayClosed, HealthApp};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use goals::{DailyGoals, GoalOutcome, GoalsPatch};
pub use insights::{LongTermStats, WeeklyStats};
pub use journal::{ExerciseLogEntry, MealLogEntry, MealType, NewExercise, NewMeal};
pub use notify::{MemoryNotifier, Notifier};
pub use profile::{calculate_bmi, BmiCategory, ProfilePatch, UserProfile};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, WriteBehindStore};
pub use error::{HealthSyncError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
