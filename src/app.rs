//! Application state
//!
//! [`HealthApp`] owns every store plus the persistence, clock and notifier
//! seams. Mutations update memory first and persist best-effort; only
//! validation errors stop an operation.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::ai::MealRecommendation;
use crate::clock::Clock;
use crate::error::{ExportError, Result, StorageError};
use crate::export::{self, ExportFormat, ExportKind};
use crate::goals::{evaluate_day, DailyGoals, GoalOutcome, GoalStore, GoalsPatch};
use crate::insights::{self, LongTermStats, WeeklyStats};
use crate::journal::{
    ExerciseJournal, ExerciseLogEntry, ExerciseTotals, MealJournal, MealLogEntry, NewExercise,
    NewMeal,
};
use crate::metrics::{Counter, MetricsStore};
use crate::models::{DayPatch, DaySummary, MetricField, MetricsState};
use crate::notify::Notifier;
use crate::preferences::ThemePreference;
use crate::profile::{ProfilePatch, ProfileSeed, ProfileStore, UserProfile};
use crate::rollover;
use crate::storage::KeyValueStore;
use crate::validation::{validate_body_metrics, RegistrationForm};

/// What `log_day` did
#[derive(Debug, Clone, PartialEq)]
pub struct DayClosed {
    pub closed: DaySummary,
    pub outcome: GoalOutcome,
}

pub struct HealthApp {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
    profile: ProfileStore,
    goals: GoalStore,
    metrics: MetricsStore,
    meals: MealJournal,
    exercises: ExerciseJournal,
    theme: ThemePreference,
}

impl HealthApp {
    /// Load every document and roll the current day forward.
    ///
    /// Unreadable documents are logged and replaced with defaults.
    pub fn load(
        mut store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        let today = clock.today();

        let profile = or_default(ProfileStore::load(store.as_ref()), "profile");
        let goals = or_default(GoalStore::load(store.as_ref()), "goals");
        let seed = profile.seed();
        let metrics = match MetricsStore::load(store.as_mut(), today, seed) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(error = %e, "Could not load metrics, starting from defaults");
                MetricsStore::from_state(rollover::rollover_if_needed(None, today, seed).state)
            }
        };
        let meals = or_default(MealJournal::load(store.as_ref()), "meal log");
        let exercises = or_default(ExerciseJournal::load(store.as_ref()), "exercise log");
        let theme = or_default(ThemePreference::load(store.as_ref()), "theme preference");

        info!(
            today = %today,
            history = metrics.history().len(),
            meals = meals.len(),
            exercises = exercises.len(),
            "Health data loaded"
        );

        Ok(Self {
            store,
            clock,
            notifier,
            profile,
            goals,
            metrics,
            meals,
            exercises,
            theme,
        })
    }

    pub fn today_date(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn today(&self) -> &DaySummary {
        self.metrics.today()
    }

    /// Archived days, newest first
    pub fn history(&self) -> &[DaySummary] {
        self.metrics.history()
    }

    pub fn metrics(&self) -> &MetricsState {
        self.metrics.state()
    }

    pub fn goals(&self) -> &DailyGoals {
        self.goals.goals()
    }

    pub fn profile(&self) -> &UserProfile {
        self.profile.profile()
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    pub fn update_today(&mut self, patch: &DayPatch) -> &DaySummary {
        self.metrics.update_today(patch, self.store.as_mut())
    }

    /// Parse and set one field of today
    pub fn set_field(&mut self, field: MetricField, raw: &str) -> Result<&DaySummary> {
        let patch = field.parse_patch(raw)?;
        debug!(field = %field, value = raw, "Setting metric");
        Ok(self.update_today(&patch))
    }

    pub fn add(&mut self, counter: Counter, amount: i64) -> u32 {
        self.metrics.add(counter, amount, self.store.as_mut())
    }

    pub fn add_steps(&mut self, amount: i64) -> u32 {
        self.add(Counter::Steps, amount)
    }

    pub fn add_water(&mut self, amount: i64) -> u32 {
        self.add(Counter::Water, amount)
    }

    pub fn add_calories(&mut self, amount: i64) -> u32 {
        self.add(Counter::Calories, amount)
    }

    /// Archive today, start a fresh day, and notify on the closed day's
    /// goal outcome. A failed notification is logged and ignored.
    pub fn log_day(&mut self) -> DayClosed {
        let date = self.clock.today();
        let closed = self.metrics.close_day(date, self.store.as_mut());
        let outcome = evaluate_day(&closed, self.goals.goals());

        if let (Some(title), Some(body)) = (outcome.title(), outcome.body()) {
            if let Err(e) = self.notifier.notify(title, body) {
                warn!(error = %e, "Notification dispatch failed");
            }
        }
        debug!(outcome = %outcome, "Evaluated closed day");

        DayClosed { closed, outcome }
    }

    pub fn update_goals(&mut self, patch: &GoalsPatch) -> DailyGoals {
        self.goals.update(patch, self.store.as_mut())
    }

    pub fn recommendations(&self) -> Vec<String> {
        insights::recommendations(self.today(), self.goals())
    }

    pub fn weekly_stats(&self) -> WeeklyStats {
        insights::weekly_stats(self.metrics())
    }

    pub fn long_term_stats(&self) -> LongTermStats {
        insights::long_term_stats(self.metrics(), self.goals())
    }

    pub fn update_profile(&mut self, patch: ProfilePatch) -> &UserProfile {
        self.profile.update_profile(patch, self.store.as_mut());
        self.profile.profile()
    }

    /// Save a profile edited in settings and re-sync today's weight and BMI
    pub fn save_profile_settings(&mut self, profile: UserProfile) -> Result<&UserProfile> {
        validate_body_metrics(profile.height, profile.weight)?;
        self.profile.save_profile(profile, self.store.as_mut());
        if let Some(seed) = ProfileSeed::from_profile(self.profile.profile()) {
            self.metrics.sync_profile(seed, self.store.as_mut());
        }
        Ok(self.profile.profile())
    }

    /// Validate a sign-up form and store the profile it describes
    pub fn register(&mut self, form: &RegistrationForm) -> Result<&UserProfile> {
        let profile = form.validate(self.clock.today())?;
        info!(name = %profile.name, "Registered profile");
        self.save_profile_settings(profile)
    }

    pub fn meals(&self) -> &MealJournal {
        &self.meals
    }

    pub fn exercises(&self) -> &ExerciseJournal {
        &self.exercises
    }

    pub fn add_meal(&mut self, meal: NewMeal) -> Result<&MealLogEntry> {
        let entry = meal.into_entry(self.clock.now())?;
        Ok(self.meals.add(entry, self.store.as_mut()))
    }

    pub fn delete_meal(&mut self, id: &str) -> bool {
        self.meals.delete(id, self.store.as_mut())
    }

    pub fn meals_on(&self, date: NaiveDate) -> Vec<&MealLogEntry> {
        self.meals.by_date(date)
    }

    pub fn meal_calories_on(&self, date: NaiveDate) -> f64 {
        self.meals.total_calories(date)
    }

    /// Journal a suggested meal under today's date
    pub fn log_recommended_meal(&mut self, rec: &MealRecommendation) -> Result<&MealLogEntry> {
        let meal = NewMeal {
            date: self.clock.today(),
            meal_type: rec.category,
            food_name: rec.name.clone(),
            calories: rec.calories,
            protein: rec.protein,
            carbs: rec.carbs,
            fat: rec.fat,
            notes: Some(rec.reason.clone()).filter(|r| !r.trim().is_empty()),
        };
        let entry = meal.into_entry(self.clock.now())?;
        Ok(self.meals.add(entry, self.store.as_mut()))
    }

    pub fn add_exercise(&mut self, exercise: NewExercise) -> Result<&ExerciseLogEntry> {
        let entry = exercise.into_entry(self.clock.now())?;
        Ok(self.exercises.add(entry, self.store.as_mut()))
    }

    pub fn delete_exercise(&mut self, id: &str) -> bool {
        self.exercises.delete(id, self.store.as_mut())
    }

    pub fn exercises_on(&self, date: NaiveDate) -> Vec<&ExerciseLogEntry> {
        self.exercises.by_date(date)
    }

    pub fn exercise_totals_on(&self, date: NaiveDate) -> ExerciseTotals {
        self.exercises.totals(date)
    }

    pub fn set_theme(&mut self, theme: ThemePreference) {
        self.theme = theme;
        self.theme.persist(self.store.as_mut());
    }

    /// Write `[today, ...history]` in the given shape; returns the file path
    pub fn export(
        &self,
        kind: ExportKind,
        format: ExportFormat,
        output_dir: &Path,
    ) -> std::result::Result<PathBuf, ExportError> {
        export::export_history(self.metrics(), kind, format, output_dir, self.clock.today())
    }

    /// Block until queued writes reach the backing store
    pub fn flush(&mut self) -> std::result::Result<(), StorageError> {
        self.store.flush()
    }
}

impl Drop for HealthApp {
    fn drop(&mut self) {
        if let Err(e) = self.store.flush() {
            warn!(error = %e, "Final flush failed");
        }
    }
}

fn or_default<T: Default>(loaded: std::result::Result<T, StorageError>, what: &str) -> T {
    loaded.unwrap_or_else(|e| {
        warn!(document = what, error = %e, "Could not load, using defaults");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::journal::MealType;
    use crate::notify::MemoryNotifier;
    use crate::storage::{keys, MemoryStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_on(store: &MemoryStore, clock: &FixedClock, notifier: &MemoryNotifier) -> HealthApp {
        HealthApp::load(
            Box::new(store.clone()),
            Box::new(clock.clone()),
            Box::new(notifier.clone()),
        )
        .unwrap()
    }

    #[test]
    fn test_fresh_install_uses_defaults() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let app = app_on(&store, &clock, &MemoryNotifier::new());

        assert_eq!(app.today().date, date(2024, 9, 2));
        assert_eq!(app.today().steps, 5420);
        assert!(app.history().is_empty());
        assert_eq!(app.goals().steps, 8000);
        assert_eq!(app.theme(), ThemePreference::Light);
    }

    #[test]
    fn test_log_day_scenario() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let notifier = MemoryNotifier::new();
        let mut app = app_on(&store, &clock, &notifier);

        assert_eq!(app.add_steps(500), 5920);
        let closed = app.log_day();

        assert_eq!(closed.closed.steps, 5920);
        assert_eq!(app.history()[0].steps, 5920);
        assert_eq!(app.today().steps, 5420);
        // default day: steps 0.74, water 0.6, sleep 0.4, calories 0.76
        assert_eq!(closed.outcome, GoalOutcome::NoChange);
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn test_log_day_celebrates() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let notifier = MemoryNotifier::new();
        let mut app = app_on(&store, &clock, &notifier);

        app.update_today(&DayPatch {
            steps: Some(9000),
            water: Some(90),
            sleep: Some(8.0),
            ..Default::default()
        });
        assert_eq!(app.log_day().outcome, GoalOutcome::Celebrate);
        assert_eq!(notifier.sent()[0].title, "Goals completed 🎉");
    }

    #[test]
    fn test_reload_next_day_archives() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        {
            let mut app = app_on(&store, &clock, &MemoryNotifier::new());
            app.add_water(10);
        }
        clock.advance_days(1);
        let app = app_on(&store, &clock, &MemoryNotifier::new());
        assert_eq!(app.today().date, date(2024, 9, 3));
        assert_eq!(app.history()[0].water, 58);
    }

    #[test]
    fn test_save_profile_settings_resyncs_today() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let mut app = app_on(&store, &clock, &MemoryNotifier::new());

        let mut profile = app.profile().clone();
        profile.weight = 180.0;
        app.save_profile_settings(profile.clone()).unwrap();
        assert_eq!(app.today().weight, 180.0);
        assert!((app.today().bmi - 25.8).abs() < 0.05);

        profile.height = 0.0;
        let err = app.save_profile_settings(profile).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Please enter a valid height");
        assert_eq!(app.profile().height, 70.0);
    }

    #[test]
    fn test_meal_journal_round_trip_through_store() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let mut app = app_on(&store, &clock, &MemoryNotifier::new());

        let id = app
            .add_meal(NewMeal {
                date: date(2024, 9, 2),
                meal_type: MealType::Lunch,
                food_name: "Salad".to_string(),
                calories: 350.0,
                protein: 20.0,
                carbs: 30.0,
                fat: 10.0,
                notes: None,
            })
            .unwrap()
            .id
            .clone();
        assert!(store.get(keys::MEAL_LOGS).unwrap().is_some());

        let reloaded = app_on(&store, &clock, &MemoryNotifier::new());
        assert_eq!(reloaded.meals_on(date(2024, 9, 2)).len(), 1);
        assert_eq!(reloaded.meal_calories_on(date(2024, 9, 2)), 350.0);

        assert!(app.delete_meal(&id));
        assert!(!app.delete_meal(&id));
    }

    #[test]
    fn test_invalid_meal_is_rejected_before_mutation() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let mut app = app_on(&store, &clock, &MemoryNotifier::new());

        let err = app
            .add_meal(NewMeal {
                date: date(2024, 9, 2),
                meal_type: MealType::Lunch,
                food_name: "  ".to_string(),
                calories: 350.0,
                protein: 0.0,
                carbs: 0.0,
                fat: 0.0,
                notes: None,
            })
            .unwrap_err();
        assert_eq!(err.user_message(), "Please enter a food name");
        assert!(app.meals().is_empty());
    }

    #[test]
    fn test_log_recommended_meal_leaves_calories_alone() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let mut app = app_on(&store, &clock, &MemoryNotifier::new());

        let rec = crate::ai::fallback::meal_recommendations(520.0).remove(1);
        app.log_recommended_meal(&rec).unwrap();
        assert_eq!(app.today().calories, 1680);
        assert_eq!(app.meals().entries()[0].meal_type, MealType::Snack);
        assert_eq!(app.meal_calories_on(date(2024, 9, 2)), rec.calories);
    }

    #[test]
    fn test_theme_persists() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        let mut app = app_on(&store, &clock, &MemoryNotifier::new());
        app.set_theme(ThemePreference::Dark);

        let reloaded = app_on(&store, &clock, &MemoryNotifier::new());
        assert_eq!(reloaded.theme(), ThemePreference::Dark);
    }
}
