use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use healthsync::ai::{
    AiAssistant, ChatContext, Difficulty, MealPreferences, PartialAddress, WorkoutPreferences,
};
use healthsync::app::HealthApp;
use healthsync::clock::{Clock, FixedClock, SystemClock};
use healthsync::config::AppConfig;
use healthsync::error::HealthSyncError;
use healthsync::export::{ExportFormat, ExportKind};
use healthsync::goals::{goal_ratio, GoalsPatch};
use healthsync::journal::{ExerciseLogEntry, MealLogEntry, MealType, NewExercise, NewMeal};
use healthsync::logging::init_logging;
use healthsync::metrics::Counter;
use healthsync::models::{DaySummary, MetricField};
use healthsync::notify::ConsoleNotifier;
use healthsync::preferences::ThemePreference;
use healthsync::profile::BmiCategory;
use healthsync::storage::open_store;
use healthsync::validation::{parse_date, RegistrationForm};

/// HealthSync - Personal Health Tracking CLI
///
/// Tracks daily health metrics against goals, keeps a rolling 30-day history,
/// and logs meals and exercise. Optional AI suggestions when an API key is set.
#[derive(Parser)]
#[command(name = "healthsync")]
#[command(author = "HealthSync Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Personal Health Tracking CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Act as if today were this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's metrics against goals
    Status,

    /// Add to a counter (steps, water, calories); negative amounts subtract
    Add {
        counter: String,

        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },

    /// Set one of today's metrics (e.g. `set blood-pressure 118/76`)
    Set { field: String, value: String },

    /// Archive today and start a fresh day
    LogDay,

    /// Show or update daily goals
    Goals {
        #[arg(long)]
        steps: Option<u32>,

        /// Water in oz
        #[arg(long)]
        water: Option<u32>,

        /// Sleep in hours
        #[arg(long)]
        sleep: Option<f64>,

        #[arg(long)]
        calories: Option<u32>,
    },

    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Create a profile from a sign-up form
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        /// YYYY-MM-DD or MM/DD/YYYY
        #[arg(long)]
        date_of_birth: String,
        #[arg(long)]
        address: String,
        /// Inches
        #[arg(long)]
        height: f64,
        /// Lbs
        #[arg(long)]
        weight: f64,
    },

    /// Recommendations, weekly and 30-day statistics
    Insights,

    /// Show archived days
    History {
        /// Number of days to show
        #[arg(short, long, default_value = "7")]
        limit: usize,
    },

    /// Meal journal
    Meal {
        #[command(subcommand)]
        action: MealAction,
    },

    /// Exercise journal
    Exercise {
        #[command(subcommand)]
        action: ExerciseAction,
    },

    /// Export today plus history as a meal or exercise log
    Export {
        /// meals or exercise
        kind: String,

        /// Export format (json, csv)
        #[arg(short = 'f', long, default_value = "json")]
        format: String,

        /// Output directory (defaults to the configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or set the light/dark theme
    Theme { value: Option<String> },

    /// AI assistant features
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,
        /// Inches
        #[arg(long)]
        height: Option<f64>,
        /// Lbs
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        date_of_birth: Option<String>,
    },
}

#[derive(Subcommand)]
enum MealAction {
    Add {
        /// breakfast, lunch, dinner or snack
        #[arg(short = 't', long, default_value = "breakfast")]
        meal_type: String,
        food: String,
        calories: f64,
        #[arg(long, default_value = "0")]
        protein: f64,
        #[arg(long, default_value = "0")]
        carbs: f64,
        #[arg(long, default_value = "0")]
        fat: f64,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    List {
        #[arg(long)]
        date: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum ExerciseAction {
    Add {
        exercise_type: String,
        /// Minutes
        duration: f64,
        #[arg(long, default_value = "0")]
        calories_burned: f64,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    List {
        #[arg(long)]
        date: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand)]
enum AiAction {
    /// Short greeting for today
    Greeting,
    /// Home screen recommendations
    Recommend,
    /// Insights on today and recent history
    Insights,
    /// Meal ideas for the remaining calories
    Meals {
        #[arg(long, value_delimiter = ',')]
        restrictions: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        favorites: Vec<String>,
        /// Log the Nth suggestion for today (1-based)
        #[arg(long)]
        log: Option<usize>,
    },
    /// Workout plan
    Workout {
        /// Minutes
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        focus: Option<String>,
        #[arg(long, value_delimiter = ',')]
        equipment: Vec<String>,
    },
    /// Ask a question
    Chat {
        message: String,
        /// Leave out today's data and goals
        #[arg(long)]
        no_context: bool,
    },
    /// Complete a partial US address
    Address {
        #[arg(long)]
        street: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        zip: Option<String>,
    },
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: NaiveDate,
    #[tabled(rename = "Steps")]
    steps: u32,
    #[tabled(rename = "Water (oz)")]
    water: u32,
    #[tabled(rename = "Sleep (h)")]
    sleep: f64,
    #[tabled(rename = "Calories")]
    calories: u32,
    #[tabled(rename = "Activity %")]
    activity: u32,
    #[tabled(rename = "Weight")]
    weight: f64,
    #[tabled(rename = "BMI")]
    bmi: String,
}

impl From<&DaySummary> for DayRow {
    fn from(day: &DaySummary) -> Self {
        Self {
            date: day.date,
            steps: day.steps,
            water: day.water,
            sleep: day.sleep,
            calories: day.calories,
            activity: day.activity,
            weight: day.weight,
            bmi: format!("{:.1}", day.bmi),
        }
    }
}

#[derive(Tabled)]
struct MealRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    meal_type: MealType,
    #[tabled(rename = "Food")]
    food: String,
    #[tabled(rename = "kcal")]
    calories: f64,
    #[tabled(rename = "P/C/F (g)")]
    macros: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&MealLogEntry> for MealRow {
    fn from(e: &MealLogEntry) -> Self {
        Self {
            id: e.id.clone(),
            meal_type: e.meal_type,
            food: e.food_name.clone(),
            calories: e.calories,
            macros: format!("{}/{}/{}", e.protein, e.carbs, e.fat),
            notes: e.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ExerciseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Minutes")]
    duration: f64,
    #[tabled(rename = "kcal burned")]
    calories_burned: f64,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl From<&ExerciseLogEntry> for ExerciseRow {
    fn from(e: &ExerciseLogEntry) -> Self {
        Self {
            id: e.id.clone(),
            exercise: e.exercise_type.clone(),
            duration: e.duration,
            calories_burned: e.calories_burned,
            notes: e.notes.clone().unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(Some(&config_path));

    // Set up logging based on verbosity
    let log_config = config.logging.clone().with_verbosity(cli.verbose);
    init_logging(&log_config)?;

    if cli.verbose > 0 {
        eprintln!("{}", format!("Log level: {:?}", log_config.level).dimmed());
    }

    // Config commands never touch health data.
    if let Commands::Config { list, set, get } = &cli.command {
        return handle_config(&mut config, &config_path, *list, set.as_deref(), get.as_deref());
    }

    let clock: Box<dyn Clock> = match cli.today.as_deref() {
        Some(raw) => Box::new(FixedClock::on(parse_cli_date(raw)?)),
        None => Box::new(SystemClock::new(config.day.boundary)),
    };

    let store = open_store(&config.storage).with_context(|| {
        format!(
            "Failed to open health data in {}",
            config.storage.data_dir.display()
        )
    })?;
    let mut app = HealthApp::load(store, clock, Box::new(ConsoleNotifier)).map_err(user_error)?;

    match cli.command {
        Commands::Status => print_status(&app),

        Commands::Add { counter, amount } => {
            let counter: Counter = counter.parse()?;
            let value = app.add(counter, amount);
            println!("{} {:?} is now {}", "✓".green(), counter, value.to_string().bold());
        }

        Commands::Set { field, value } => {
            let field: MetricField = field.parse()?;
            app.set_field(field, &value).map_err(user_error)?;
            println!("{} Updated {}", "✓".green(), field);
        }

        Commands::LogDay => {
            let result = app.log_day();
            println!(
                "{} Logged {} ({} steps, {} oz water, {} h sleep, {} kcal)",
                "✓".green(),
                result.closed.date,
                result.closed.steps,
                result.closed.water,
                result.closed.sleep,
                result.closed.calories
            );
        }

        Commands::Goals {
            steps,
            water,
            sleep,
            calories,
        } => {
            let patch = GoalsPatch {
                steps,
                water,
                sleep,
                calories,
            };
            if !patch.is_empty() {
                app.update_goals(&patch);
                println!("{}", "✓ Goals updated".green());
            }
            let goals = app.goals();
            println!("{}", "Daily goals".bold());
            println!("  Steps:    {}", goals.steps);
            println!("  Water:    {} oz", goals.water);
            println!("  Sleep:    {} h", goals.sleep);
            println!("  Calories: {} kcal", goals.calories);
        }

        Commands::Profile { action } => match action {
            ProfileAction::Show => print_profile(&app),
            ProfileAction::Set {
                name,
                height,
                weight,
                email,
                address,
                date_of_birth,
            } => {
                let mut profile = app.profile().clone();
                if let Some(v) = name {
                    profile.name = v;
                }
                if let Some(v) = height {
                    profile.height = v;
                }
                if let Some(v) = weight {
                    profile.weight = v;
                }
                if let Some(v) = email {
                    profile.email = Some(v);
                }
                if let Some(v) = address {
                    profile.address = Some(v);
                }
                if let Some(raw) = date_of_birth {
                    profile.date_of_birth = Some(parse_cli_date(&raw)?);
                }
                app.save_profile_settings(profile).map_err(user_error)?;
                println!("{}", "✓ Profile saved".green());
                print_profile(&app);
            }
        },

        Commands::Register {
            name,
            email,
            password,
            confirm_password,
            date_of_birth,
            address,
            height,
            weight,
        } => {
            let form = RegistrationForm {
                name,
                email,
                password,
                confirm_password,
                date_of_birth,
                address,
                height,
                weight,
            };
            let profile = app.register(&form).map_err(user_error)?;
            println!("{} Welcome, {}!", "✓".green(), profile.name.bold());
        }

        Commands::Insights => print_insights(&app),

        Commands::History { limit } => {
            let today = app.today_date();
            let rows: Vec<DayRow> = app
                .history()
                .iter()
                .filter(|d| d.date != today)
                .take(limit)
                .map(DayRow::from)
                .collect();
            if rows.is_empty() {
                println!("{}", "No history yet. Use `log-day` to archive a day.".yellow());
            } else {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }

        Commands::Meal { action } => match action {
            MealAction::Add {
                meal_type,
                food,
                calories,
                protein,
                carbs,
                fat,
                notes,
                date,
            } => {
                let meal = NewMeal {
                    date: date_or_today(date.as_deref(), &app)?,
                    meal_type: meal_type.parse()?,
                    food_name: food,
                    calories,
                    protein,
                    carbs,
                    fat,
                    notes,
                };
                let entry = app.add_meal(meal).map_err(user_error)?;
                println!("{} Logged {} ({})", "✓".green(), entry.food_name, entry.id.dimmed());
            }
            MealAction::List { date } => {
                let date = date_or_today(date.as_deref(), &app)?;
                let entries = app.meals_on(date);
                if entries.is_empty() {
                    println!("{}", format!("No meals logged for {}", date).yellow());
                } else {
                    let rows: Vec<MealRow> = entries.into_iter().map(MealRow::from).collect();
                    println!("{}", Table::new(rows).with(Style::rounded()));
                    println!("Total: {} kcal", app.meal_calories_on(date));
                }
            }
            MealAction::Delete { id } => {
                if app.delete_meal(&id) {
                    println!("{} Deleted {}", "✓".green(), id);
                } else {
                    println!("{}", format!("No meal with id {}", id).yellow());
                }
            }
        },

        Commands::Exercise { action } => match action {
            ExerciseAction::Add {
                exercise_type,
                duration,
                calories_burned,
                notes,
                date,
            } => {
                let exercise = NewExercise {
                    date: date_or_today(date.as_deref(), &app)?,
                    exercise_type,
                    duration,
                    calories_burned,
                    notes,
                };
                let entry = app.add_exercise(exercise).map_err(user_error)?;
                println!(
                    "{} Logged {} ({})",
                    "✓".green(),
                    entry.exercise_type,
                    entry.id.dimmed()
                );
            }
            ExerciseAction::List { date } => {
                let date = date_or_today(date.as_deref(), &app)?;
                let entries = app.exercises_on(date);
                if entries.is_empty() {
                    println!("{}", format!("No exercise logged for {}", date).yellow());
                } else {
                    let rows: Vec<ExerciseRow> =
                        entries.into_iter().map(ExerciseRow::from).collect();
                    println!("{}", Table::new(rows).with(Style::rounded()));
                    let totals = app.exercise_totals_on(date);
                    println!(
                        "Total: {} min, {} kcal burned",
                        totals.duration, totals.calories_burned
                    );
                }
            }
            ExerciseAction::Delete { id } => {
                if app.delete_exercise(&id) {
                    println!("{} Deleted {}", "✓".green(), id);
                } else {
                    println!("{}", format!("No exercise with id {}", id).yellow());
                }
            }
        },

        Commands::Export {
            kind,
            format,
            output,
        } => {
            let kind: ExportKind = kind.parse()?;
            let format: ExportFormat = format.parse()?;
            let dir = output.unwrap_or_else(|| config.export.output_dir.clone());
            let path = app.export(kind, format, &dir)?;
            println!("{} Exported {} to {}", "✓".green(), kind, path.display());
        }

        Commands::Theme { value } => {
            if let Some(raw) = value {
                let theme: ThemePreference = raw.parse()?;
                app.set_theme(theme);
            }
            println!("Theme: {}", app.theme().to_string().bold());
        }

        Commands::Ai { action } => {
            let ai = AiAssistant::from_settings(&config.ai);
            if !ai.is_configured() {
                eprintln!(
                    "{}",
                    format!(
                        "AI not configured (set {}); showing built-in suggestions",
                        config.ai.api_key_env
                    )
                    .dimmed()
                );
            }
            handle_ai(&mut app, &ai, action).await?;
        }

        Commands::Config { .. } => {}
    }

    app.flush().context("Failed to write health data")?;
    Ok(())
}

async fn handle_ai(app: &mut HealthApp, ai: &AiAssistant, action: AiAction) -> Result<()> {
    let today = app.today().clone();
    let goals = *app.goals();

    match action {
        AiAction::Greeting => println!("{}", ai.greeting(&today, &goals).await.bold()),

        AiAction::Recommend => {
            for rec in ai.home_recommendations(&today, &goals).await {
                println!("  • {}", rec);
            }
        }

        AiAction::Insights => {
            let history: Vec<DaySummary> = app
                .history()
                .iter()
                .filter(|d| d.date != today.date)
                .cloned()
                .collect();
            for insight in ai.health_insights(&today, &goals, &history).await {
                println!("{} [{}]", insight.title.bold(), insight.priority);
                println!("  {}", insight.insight);
                println!("  → {}", insight.recommendation.green());
            }
        }

        AiAction::Meals {
            restrictions,
            favorites,
            log,
        } => {
            let remaining = f64::from(goals.calories.saturating_sub(today.calories));
            let prefs = MealPreferences {
                dietary_restrictions: restrictions,
                favorite_foods: favorites,
            };
            let meals = ai.meal_recommendations(remaining, &goals, &prefs).await;
            for (i, meal) in meals.iter().enumerate() {
                println!(
                    "{}. {} ({}, {} kcal, {} min)",
                    i + 1,
                    meal.name.bold(),
                    meal.category,
                    meal.calories,
                    meal.prep_time
                );
                println!("   {}", meal.reason.dimmed());
            }
            if let Some(n) = log {
                let meal = n
                    .checked_sub(1)
                    .and_then(|i| meals.get(i))
                    .ok_or_else(|| anyhow!("No suggestion number {}", n))?;
                let entry = app.log_recommended_meal(meal).map_err(user_error)?;
                println!("{} Logged {}", "✓".green(), entry.food_name);
            }
        }

        AiAction::Workout {
            duration,
            difficulty,
            focus,
            equipment,
        } => {
            let difficulty = difficulty
                .map(|d| d.parse::<Difficulty>())
                .transpose()?;
            let prefs = WorkoutPreferences {
                duration,
                difficulty,
                focus,
                equipment,
            };
            let plan = ai.workout_plan(&prefs).await;
            println!(
                "{} ({} min, {}, ~{} kcal)",
                plan.name.bold(),
                plan.duration,
                plan.difficulty,
                plan.calories_burned
            );
            for ex in &plan.exercises {
                let work = match (ex.sets, ex.reps, ex.duration) {
                    (Some(s), Some(r), _) => format!("{} x {}", s, r),
                    (_, _, Some(d)) => format!("{} min", d),
                    _ => String::new(),
                };
                let rest = ex.rest.map(|r| format!(", rest {}s", r)).unwrap_or_default();
                println!("  • {} {}{}", ex.name, work, rest);
            }
        }

        AiAction::Chat {
            message,
            no_context,
        } => {
            let context = ChatContext {
                current_health_data: today,
                goals,
            };
            let reply = ai
                .chat(&message, if no_context { None } else { Some(&context) })
                .await;
            println!("{}", reply);
        }

        AiAction::Address {
            street,
            city,
            state,
            zip,
        } => {
            let partial = PartialAddress {
                street,
                city,
                state,
                zip,
            };
            let suggestions = ai.address_suggestions(&partial).await;
            if suggestions.is_empty() {
                println!("{}", "No suggestions".yellow());
            }
            for s in suggestions {
                println!("  • {}", s.full_address);
            }
        }
    }
    Ok(())
}

fn handle_config(
    config: &mut AppConfig,
    path: &std::path::Path,
    list: bool,
    set: Option<&str>,
    get: Option<&str>,
) -> Result<()> {
    if list {
        for (key, value) in config.list()? {
            println!("{} = {}", key.cyan(), value);
        }
    } else if let Some(key_value) = set {
        let (key, value) = key_value
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected key=value, got {}", key_value))?;
        config.set_value(key.trim(), value.trim())?;
        config.save_to_file(path)?;
        println!("{} {} = {}", "✓".green(), key.trim(), value.trim());
    } else if let Some(key) = get {
        println!("{}", config.get_value(key)?);
    } else {
        println!("Config file: {}", path.display());
    }
    Ok(())
}

fn print_status(app: &HealthApp) {
    let day = app.today();
    let goals = app.goals();

    println!("{}", format!("Today · {}", day.date).bold());
    let line = |label: &str, actual: f64, goal: f64, unit: &str| {
        let pct = (goal_ratio(actual, goal) * 100.0).round();
        let pct = if pct >= 100.0 {
            format!("{}%", pct).green()
        } else if pct < 50.0 {
            format!("{}%", pct).red()
        } else {
            format!("{}%", pct).yellow()
        };
        println!("  {:<9} {} / {} {} ({})", label, actual, goal, unit, pct);
    };
    line("Steps", f64::from(day.steps), f64::from(goals.steps), "");
    line("Water", f64::from(day.water), f64::from(goals.water), "oz");
    line("Sleep", day.sleep, goals.sleep, "h");
    line("Calories", f64::from(day.calories), f64::from(goals.calories), "kcal");
    println!("  {:<9} {}%", "Activity", day.activity);
    println!("  {:<9} {}", "BP", day.blood_pressure);
    println!("  {:<9} {} mg/dL", "Sugar", day.blood_sugar);
    println!(
        "  {:<9} {:.1} ({})",
        "BMI",
        day.bmi,
        BmiCategory::from_bmi(day.bmi)
    );

    println!();
    println!("{}", "Recommendations".bold());
    for rec in app.recommendations() {
        println!("  • {}", rec);
    }
}

fn print_profile(app: &HealthApp) {
    let p = app.profile();
    println!("{}", p.name.bold());
    println!("  Height: {} in", p.height);
    println!("  Weight: {} lbs", p.weight);
    println!("  BMI:    {:.1} ({})", p.bmi(), p.bmi_category());
    if let Some(dob) = p.date_of_birth {
        println!("  Born:   {}", dob);
    }
    if let Some(email) = &p.email {
        println!("  Email:  {}", email);
    }
    if let Some(address) = &p.address {
        println!("  Address: {}", address);
    }
}

fn print_insights(app: &HealthApp) {
    println!("{}", "Recommendations".bold());
    for rec in app.recommendations() {
        println!("  • {}", rec);
    }

    let week = app.weekly_stats();
    println!();
    println!("{}", "This week (averages)".bold());
    println!("  Steps: {}", week.avg_steps);
    println!("  Sleep: {} h", week.avg_sleep);
    println!("  Water: {} oz", week.avg_water);

    let long = app.long_term_stats();
    println!();
    println!("{}", "Last 30 days".bold());
    println!("  Hydration score: {}%", long.hydration_score);
    println!("  Active days:     {}", long.active_days);
    println!(
        "  Best steps day:  {} ({} steps)",
        long.best_steps_day.date, long.best_steps_day.steps
    );
    println!("  Average weight:  {} lbs", long.avg_weight);
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| anyhow!("Invalid date: {} (expected YYYY-MM-DD)", raw))
}

fn date_or_today(raw: Option<&str>, app: &HealthApp) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_cli_date(raw),
        None => Ok(app.today_date()),
    }
}

fn user_error(e: HealthSyncError) -> anyhow::Error {
    anyhow!(e.user_message())
}
