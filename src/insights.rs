//! Derived views over the metrics document
//!
//! Everything here is a pure function of the current day, history and goals.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::Serialize;

use crate::goals::DailyGoals;
use crate::models::{DaySummary, MetricsState};

/// Days covered by weekly stats (today plus six archived days)
pub const WEEK_DAYS: usize = 7;

/// Days covered by long-term stats
pub const LONG_TERM_DAYS: usize = 30;

/// Maximum recommendations returned
pub const MAX_RECOMMENDATIONS: usize = 4;

/// Activity percentage counted as an active day
pub const ACTIVE_THRESHOLD: u32 = 60;

/// Blood sugar (mg/dL) above which a walk is suggested
pub const BLOOD_SUGAR_THRESHOLD: u32 = 110;

pub const ALL_GOALS_MET: &str = "Great job! Keep maintaining today's healthy rhythm.";

/// Up to four suggestions in fixed priority order
pub fn recommendations(today: &DaySummary, goals: &DailyGoals) -> Vec<String> {
    let rules: [(bool, &str); 6] = [
        (
            today.steps < goals.steps,
            "Time for a 10-minute walk to boost your steps.",
        ),
        (
            today.water < goals.water,
            "Drink 2 glasses of water to stay hydrated.",
        ),
        (
            today.sleep < goals.sleep,
            "Aim for at least 7 hours of sleep tonight.",
        ),
        (
            today.activity < ACTIVE_THRESHOLD,
            "Add a short stretching or cycling session.",
        ),
        (
            today.blood_sugar > BLOOD_SUGAR_THRESHOLD,
            "Take a short walk to help stabilize blood sugar.",
        ),
        (
            today.calories > goals.calories,
            "Balance calories with a light, protein-rich snack.",
        ),
    ];

    let recs: Vec<String> = rules
        .iter()
        .filter(|(triggered, _)| *triggered)
        .map(|(_, text)| text.to_string())
        .take(MAX_RECOMMENDATIONS)
        .collect();

    if recs.is_empty() {
        vec![ALL_GOALS_MET.to_string()]
    } else {
        recs
    }
}

/// Averages over the most recent seven day-records
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub avg_steps: u32,
    /// Rounded to one decimal
    pub avg_sleep: f64,
    pub avg_water: u32,
}

pub fn weekly_stats(state: &MetricsState) -> WeeklyStats {
    let days: Vec<&DaySummary> = state.days().take(WEEK_DAYS).collect();
    WeeklyStats {
        avg_steps: round_to_u32(mean(days.iter().map(|d| Decimal::from(d.steps)))),
        avg_sleep: round_to_tenth(mean(days.iter().map(|d| decimal(d.sleep)))),
        avg_water: round_to_u32(mean(days.iter().map(|d| Decimal::from(d.water)))),
    }
}

/// Summary over the most recent thirty day-records
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermStats {
    /// Percentage of days meeting the water goal
    pub hydration_score: u32,
    /// Days with activity at or above 60%
    pub active_days: usize,
    pub best_steps_day: DaySummary,
    /// Rounded to one decimal
    pub avg_weight: f64,
}

pub fn long_term_stats(state: &MetricsState, goals: &DailyGoals) -> LongTermStats {
    let days: Vec<&DaySummary> = state.days().take(LONG_TERM_DAYS).collect();
    let len = Decimal::from(days.len().max(1));

    let hydration_days = days.iter().filter(|d| d.water >= goals.water).count();
    let hydration = Decimal::from(hydration_days) / len * Decimal::ONE_HUNDRED;

    // First day wins on ties, so the most recent maximum is reported.
    let best_steps_day = days
        .iter()
        .fold(None::<&DaySummary>, |best, day| match best {
            Some(b) if day.steps <= b.steps => Some(b),
            _ => Some(*day),
        })
        .cloned()
        .unwrap_or_else(|| DaySummary::fresh(state.today.date));

    LongTermStats {
        hydration_score: round_to_u32(hydration),
        active_days: days
            .iter()
            .filter(|d| d.activity >= ACTIVE_THRESHOLD)
            .count(),
        best_steps_day,
        avg_weight: round_to_tenth(mean(days.iter().map(|d| decimal(d.weight)))),
    }
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Arithmetic mean; zero for an empty input
fn mean(values: impl Iterator<Item = Decimal>) -> Decimal {
    let (sum, count) = values.fold((Decimal::ZERO, 0u32), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    }
}

/// Nearest integer, halves away from zero
fn round_to_u32(value: Decimal) -> u32 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// One decimal place, halves away from zero (7.05 -> 7.1)
fn round_to_tenth(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}
