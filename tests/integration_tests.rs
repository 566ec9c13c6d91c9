use chrono::NaiveDate;
use healthsync::insights::ALL_GOALS_MET;
use healthsync::storage::{keys, KeyValueStore, MemoryStore, SqliteStore, WriteBehindStore};
use healthsync::{DayPatch, FixedClock, GoalOutcome, GoalsPatch, HealthApp, MemoryNotifier};

/// Integration tests that drive the complete application state

#[cfg(test)]
mod integration_tests {
    use super::*;
    use healthsync::models::MetricsState;
    use healthsync::profile::ProfilePatch;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn load(
        store: Box<dyn KeyValueStore>,
        clock: &FixedClock,
        notifier: &MemoryNotifier,
    ) -> HealthApp {
        HealthApp::load(store, Box::new(clock.clone()), Box::new(notifier.clone())).unwrap()
    }

    fn open_sqlite(dir: &TempDir) -> Box<dyn KeyValueStore> {
        Box::new(SqliteStore::open(dir.path().join("health.db")).unwrap())
    }

    /// Fresh install, add steps, close the day, reload
    #[test]
    fn test_end_to_end_scenario() {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock::on(date(2024, 9, 2));
        let notifier = MemoryNotifier::new();

        {
            let mut app = load(open_sqlite(&dir), &clock, &notifier);
            assert_eq!(app.today().steps, 5420);

            assert_eq!(app.add_steps(500), 5920);
            let closed = app.log_day();
            assert_eq!(closed.closed.steps, 5920);
            assert_eq!(closed.outcome, GoalOutcome::NoChange);

            assert_eq!(app.history().len(), 1);
            assert_eq!(app.history()[0].steps, 5920);
            assert_eq!(app.today().steps, 5420);
        }

        let app = load(open_sqlite(&dir), &clock, &notifier);
        assert_eq!(app.history()[0].steps, 5920);
        assert_eq!(app.today().steps, 5420);
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn test_rollover_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock::on(date(2024, 9, 2));
        let notifier = MemoryNotifier::new();

        {
            let mut app = load(open_sqlite(&dir), &clock, &notifier);
            app.add_water(12);
        }

        clock.set_date(date(2024, 9, 5));
        let first = load(open_sqlite(&dir), &clock, &notifier).metrics().clone();
        let second = load(open_sqlite(&dir), &clock, &notifier).metrics().clone();

        assert_eq!(first, second);
        assert_eq!(first.today.date, date(2024, 9, 5));
        assert_eq!(first.history.len(), 1);
        assert_eq!(first.history[0].date, date(2024, 9, 2));
        assert_eq!(first.history[0].water, 60);
    }

    #[test]
    fn test_history_is_bounded_and_sorted() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 1, 1));
        let notifier = MemoryNotifier::new();
        let mut app = load(Box::new(store.clone()), &clock, &notifier);

        for _ in 0..40 {
            clock.advance_days(1);
            app.log_day();
        }

        let history = app.history();
        assert_eq!(history.len(), 30);
        assert!(history.windows(2).all(|w| w[0].date >= w[1].date));
        // newest archived day is the one dated the day before the last close
        assert_eq!(history[0].date, date(2024, 2, 9));

        let raw = store.get(keys::METRICS).unwrap().unwrap();
        let persisted: MetricsState = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.history.len(), 30);
    }

    #[test]
    fn test_notification_thresholds() {
        let clock = FixedClock::on(date(2024, 9, 2));
        let notifier = MemoryNotifier::new();
        let mut app = load(Box::new(MemoryStore::new()), &clock, &notifier);

        // three of four goals met
        app.update_today(&DayPatch {
            steps: Some(8000),
            water: Some(80),
            sleep: Some(7.5),
            calories: Some(100),
            ..Default::default()
        });
        assert_eq!(app.log_day().outcome, GoalOutcome::Celebrate);

        // two goals under half way
        app.update_today(&DayPatch {
            steps: Some(3999),
            water: Some(39),
            sleep: Some(7.5),
            calories: Some(2200),
            ..Default::default()
        });
        assert_eq!(app.log_day().outcome, GoalOutcome::Refocus);

        // only one goal far off
        app.update_today(&DayPatch {
            steps: Some(100),
            water: Some(79),
            sleep: Some(7.4),
            calories: Some(2199),
            ..Default::default()
        });
        assert_eq!(app.log_day().outcome, GoalOutcome::NoChange);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].title, "Goals completed 🎉");
        assert_eq!(sent[1].title, "Let's refocus");
    }

    #[test]
    fn test_zero_goal_counts_as_unmet() {
        let clock = FixedClock::on(date(2024, 9, 2));
        let notifier = MemoryNotifier::new();
        let mut app = load(Box::new(MemoryStore::new()), &clock, &notifier);

        app.update_goals(&GoalsPatch {
            steps: Some(0),
            water: Some(0),
            ..Default::default()
        });
        app.update_today(&DayPatch {
            sleep: Some(8.0),
            calories: Some(2200),
            ..Default::default()
        });
        // steps and water ratios are 0, so two far-off goals
        assert_eq!(app.log_day().outcome, GoalOutcome::Refocus);
    }

    #[test]
    fn test_increments_never_go_negative() {
        let clock = FixedClock::on(date(2024, 9, 2));
        let mut app = load(Box::new(MemoryStore::new()), &clock, &MemoryNotifier::new());

        assert_eq!(app.add_steps(-100_000), 0);
        assert_eq!(app.add_water(-49), 0);
        assert_eq!(app.add_calories(-1), 1679);
        assert_eq!(app.add_water(8), 8);
    }

    #[test]
    fn test_recommendation_priority_and_cap() {
        let clock = FixedClock::on(date(2024, 9, 2));
        let mut app = load(Box::new(MemoryStore::new()), &clock, &MemoryNotifier::new());

        app.update_today(&DayPatch {
            activity: Some(40),
            blood_sugar: Some(130),
            calories: Some(2500),
            ..Default::default()
        });
        let recs = app.recommendations();
        assert_eq!(recs.len(), 4);
        assert!(recs[0].contains("walk to boost your steps"));
        assert!(recs[3].contains("stretching"));

        app.update_today(&DayPatch {
            steps: Some(8000),
            water: Some(80),
            sleep: Some(8.0),
            activity: Some(60),
            blood_sugar: Some(110),
            calories: Some(2200),
            ..Default::default()
        });
        assert_eq!(app.recommendations(), vec![ALL_GOALS_MET.to_string()]);
    }

    #[test]
    fn test_weekly_stats_round_half_away_from_zero() {
        let clock = FixedClock::on(date(2024, 9, 1));
        let mut app = load(Box::new(MemoryStore::new()), &clock, &MemoryNotifier::new());

        // six closed days plus today: sleep sums to 49.35 over 7 days = 7.05
        let sleeps = [7.0, 7.0, 7.0, 7.0, 7.0, 7.35, 7.0];
        for (i, sleep) in sleeps.iter().enumerate() {
            app.update_today(&DayPatch {
                sleep: Some(*sleep),
                steps: Some(1000 * (i as u32 + 1)),
                ..Default::default()
            });
            if i < 6 {
                clock.advance_days(1);
                app.log_day();
            }
        }

        let week = app.weekly_stats();
        assert_eq!(week.avg_steps, 4000);
        assert_eq!(week.avg_sleep, 7.1);
    }

    #[test]
    fn test_persisted_profile_seeds_new_day() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        {
            let mut app = load(Box::new(store.clone()), &clock, &MemoryNotifier::new());
            app.update_profile(ProfilePatch {
                weight: Some(150.0),
                ..Default::default()
            });
            app.add_water(8);
        }

        clock.advance_days(1);
        {
            let app = load(Box::new(store.clone()), &clock, &MemoryNotifier::new());
            assert_eq!(app.today().weight, 150.0);
            assert!((app.today().bmi - 21.5).abs() < 0.05);
            // the archived day kept the weight it had
            assert_eq!(app.history().len(), 1);
            assert_eq!(app.history()[0].weight, 165.0);
        }

        // the seeded day was saved on load, so it is archived with its seed
        clock.advance_days(1);
        let app = load(Box::new(store.clone()), &clock, &MemoryNotifier::new());
        assert_eq!(app.history().len(), 2);
        assert_eq!(app.history()[0].date, date(2024, 9, 3));
        assert_eq!(app.history()[0].weight, 150.0);
        assert_eq!(app.history()[1].date, date(2024, 9, 2));
    }

    #[test]
    fn test_untouched_day_without_profile_is_not_archived() {
        let store = MemoryStore::new();
        let clock = FixedClock::on(date(2024, 9, 2));
        {
            let mut app = load(Box::new(store.clone()), &clock, &MemoryNotifier::new());
            app.update_profile(ProfilePatch {
                weight: Some(150.0),
                ..Default::default()
            });
        }

        clock.advance_days(1);
        let app = load(Box::new(store.clone()), &clock, &MemoryNotifier::new());
        assert!(app.history().is_empty());
        assert_eq!(app.today().weight, 150.0);
    }

    #[test]
    fn test_write_behind_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock::on(date(2024, 9, 2));
        {
            let store = WriteBehindStore::spawn(open_sqlite(&dir)).unwrap();
            let mut app = load(Box::new(store), &clock, &MemoryNotifier::new());
            app.add_steps(80);
            app.flush().unwrap();
        }

        let app = load(open_sqlite(&dir), &clock, &MemoryNotifier::new());
        assert_eq!(app.today().steps, 5500);
    }

    #[test]
    fn test_corrupt_document_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::GOALS, "{not json").unwrap();
        store.set(keys::METRICS, "[]").unwrap();

        let clock = FixedClock::on(date(2024, 9, 2));
        let app = load(Box::new(store), &clock, &MemoryNotifier::new());
        assert_eq!(app.goals().steps, 8000);
        assert_eq!(app.today().date, date(2024, 9, 2));
        assert!(app.history().is_empty());
    }
}
