//! Current day and archived history
//!
//! Every mutation updates memory first and then writes the whole
//! `{today, history}` document best-effort.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{DayPatch, DaySummary, MetricsState};
use crate::profile::ProfileSeed;
use crate::rollover::{self, archive_day, Rollover};
use crate::storage::{self, keys, KeyValueStore};

/// Adjustable counters on the current day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Steps,
    Water,
    Calories,
}

impl std::str::FromStr for Counter {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "steps" => Ok(Counter::Steps),
            "water" => Ok(Counter::Water),
            "calories" => Ok(Counter::Calories),
            _ => Err(crate::error::ValidationError::UnknownField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsStore {
    state: MetricsState,
}

impl MetricsStore {
    /// Load the stored document and roll it forward to `today`
    pub fn load(
        store: &mut dyn KeyValueStore,
        today: NaiveDate,
        seed: Option<ProfileSeed>,
    ) -> Result<Self, StorageError> {
        let stored = storage::load_json::<MetricsState>(store, keys::METRICS)?;
        let Rollover {
            state,
            changed,
            archived,
        } = rollover::rollover_if_needed(stored, today, seed);

        if let Some(date) = archived {
            info!(archived = %date, today = %today, "Rolled stale day into history");
        }
        if changed {
            storage::persist_best_effort(store, keys::METRICS, &state);
        }
        debug!(history = state.history.len(), "Metrics loaded");

        Ok(Self { state })
    }

    /// Wrap an in-memory state without touching storage
    pub fn from_state(state: MetricsState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &MetricsState {
        &self.state
    }

    pub fn today(&self) -> &DaySummary {
        &self.state.today
    }

    /// Archived days, newest first
    pub fn history(&self) -> &[DaySummary] {
        &self.state.history
    }

    /// Replace the given fields of today
    pub fn update_today(&mut self, patch: &DayPatch, store: &mut dyn KeyValueStore) -> &DaySummary {
        self.state.today.apply(patch);
        self.persist(store);
        &self.state.today
    }

    /// Add a signed amount to a counter, flooring the result at zero
    pub fn add(&mut self, counter: Counter, amount: i64, store: &mut dyn KeyValueStore) -> u32 {
        let today = &mut self.state.today;
        let field = match counter {
            Counter::Steps => &mut today.steps,
            Counter::Water => &mut today.water,
            Counter::Calories => &mut today.calories,
        };
        *field = saturating_add(*field, amount);
        let value = *field;
        self.persist(store);
        value
    }

    pub fn add_steps(&mut self, amount: i64, store: &mut dyn KeyValueStore) -> u32 {
        self.add(Counter::Steps, amount, store)
    }

    pub fn add_water(&mut self, amount: i64, store: &mut dyn KeyValueStore) -> u32 {
        self.add(Counter::Water, amount, store)
    }

    pub fn add_calories(&mut self, amount: i64, store: &mut dyn KeyValueStore) -> u32 {
        self.add(Counter::Calories, amount, store)
    }

    /// Copy profile weight/BMI into today
    pub fn sync_profile(&mut self, seed: ProfileSeed, store: &mut dyn KeyValueStore) {
        rollover::apply_seed(&mut self.state.today, seed);
        self.persist(store);
    }

    /// Archive today and start a fresh default day dated `date`.
    ///
    /// Returns the closed day by value.
    pub fn close_day(&mut self, date: NaiveDate, store: &mut dyn KeyValueStore) -> DaySummary {
        let closed = std::mem::replace(&mut self.state.today, DaySummary::fresh(date));
        let history = std::mem::take(&mut self.state.history);
        self.state.history = archive_day(history, closed.clone());
        self.persist(store);
        info!(closed = %closed.date, history = self.state.history.len(), "Closed day");
        closed
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        storage::persist_best_effort(store, keys::METRICS, &self.state);
    }
}

fn saturating_add(value: u32, amount: i64) -> u32 {
    let sum = i64::from(value).saturating_add(amount);
    sum.clamp(0, i64::from(u32::MAX)) as u32
}
