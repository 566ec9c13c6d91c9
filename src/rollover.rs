//! Day rollover
//!
//! The persisted `{today, history}` document may be stale when the app
//! starts. [`rollover_if_needed`] is the single place that decides whether the
//! stored day is still current, archives it if not, and seeds the new day
//! from the profile.

use chrono::NaiveDate;

use crate::models::{DaySummary, MetricsState};
use crate::profile::ProfileSeed;

/// Maximum number of archived days kept
pub const HISTORY_LIMIT: usize = 30;

/// Result of a rollover check
#[derive(Debug, Clone, PartialEq)]
pub struct Rollover {
    pub state: MetricsState,

    /// True when the state differs from what was stored and must be persisted
    pub changed: bool,

    /// The stale day that was moved into history, if any
    pub archived: Option<NaiveDate>,
}

/// Sort newest first and keep at most [`HISTORY_LIMIT`] entries.
///
/// The sort is stable, so among same-date records the one prepended most
/// recently stays first.
pub fn normalize_history(mut history: Vec<DaySummary>) -> Vec<DaySummary> {
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history.truncate(HISTORY_LIMIT);
    history
}

/// Prepend a day to history and normalize
pub fn archive_day(history: Vec<DaySummary>, day: DaySummary) -> Vec<DaySummary> {
    let mut archived = Vec::with_capacity(history.len() + 1);
    archived.push(day);
    archived.extend(history);
    normalize_history(archived)
}

/// A fresh default day, with weight/BMI taken from the profile when given
pub fn seeded_day(date: NaiveDate, seed: Option<ProfileSeed>) -> DaySummary {
    let mut day = DaySummary::fresh(date);
    if let Some(seed) = seed {
        apply_seed(&mut day, seed);
    }
    day
}

pub fn apply_seed(day: &mut DaySummary, seed: ProfileSeed) {
    day.weight = seed.weight;
    day.bmi = seed.bmi;
}

/// Bring a stored metrics document up to `today`.
///
/// - nothing stored: fresh day, persisted only if a seed was applied
/// - stored day is today: kept, re-synced from the seed if there is one
/// - stored day is any other date: archived, replaced by a fresh day
///
/// Running it twice with the same inputs is a no-op the second time apart
/// from the seed re-sync, which writes identical values.
pub fn rollover_if_needed(
    stored: Option<MetricsState>,
    today: NaiveDate,
    seed: Option<ProfileSeed>,
) -> Rollover {
    match stored {
        None => Rollover {
            state: MetricsState {
                today: seeded_day(today, seed),
                history: Vec::new(),
            },
            changed: seed.is_some(),
            archived: None,
        },
        Some(mut state) if state.today.date == today => {
            if let Some(seed) = seed {
                apply_seed(&mut state.today, seed);
            }
            state.history = normalize_history(state.history);
            Rollover {
                state,
                changed: seed.is_some(),
                archived: None,
            }
        }
        Some(state) => {
            let archived = state.today.date;
            Rollover {
                state: MetricsState {
                    history: archive_day(state.history, state.today),
                    today: seeded_day(today, seed),
                },
                changed: true,
                archived: Some(archived),
            }
        }
    }
}
