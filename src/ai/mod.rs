//! Optional AI assistant
//!
//! Every feature returns a usable answer. When no key is configured, the call
//! fails, or the reply cannot be parsed, a deterministic local fallback is
//! returned instead and the reason is logged.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::AiSettings;
use crate::error::{AiError, ExtractError};
use crate::goals::DailyGoals;
use crate::models::DaySummary;

pub mod client;
pub mod extract;
pub mod fallback;
pub mod types;

pub use client::{ChatCompletionClient, OpenAiCompatibleClient, Provider};
pub use extract::{extract_json_array, extract_json_object};
pub use types::{
    AddressSuggestion, Difficulty, HealthInsight, InsightPriority, MealPreferences,
    MealRecommendation, PartialAddress, PlannedExercise, WorkoutPlan, WorkoutPreferences,
};

pub const MAX_MEAL_RECOMMENDATIONS: usize = 3;
pub const MAX_INSIGHTS: usize = 3;
pub const MAX_HOME_RECOMMENDATIONS: usize = 4;
pub const MAX_ADDRESS_SUGGESTIONS: usize = 5;
pub const MAX_GREETING_WORDS: usize = 10;

/// History days averaged into the insights prompt
const INSIGHT_HISTORY_DAYS: usize = 7;

/// Health data attached to a chat message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub current_health_data: DaySummary,
    pub goals: DailyGoals,
}

/// Entry point for all AI features
#[derive(Clone, Default)]
pub struct AiAssistant {
    client: Option<Arc<dyn ChatCompletionClient>>,
}

impl AiAssistant {
    pub fn new(client: Arc<dyn ChatCompletionClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Assistant that always answers from fallbacks
    pub fn offline() -> Self {
        Self::default()
    }

    /// Build from settings, reading the key from the environment
    pub fn from_settings(settings: &AiSettings) -> Self {
        if !settings.enabled {
            debug!("AI assistant disabled in configuration");
            return Self::offline();
        }
        match OpenAiCompatibleClient::from_env(settings) {
            Ok(client) => {
                debug!(
                    endpoint = client.endpoint(),
                    model = client.model(),
                    "AI assistant configured"
                );
                Self::new(Arc::new(client))
            }
            Err(e) => {
                debug!(error = %e, "AI assistant not configured, using fallbacks");
                Self::offline()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn ask(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        let client = self.client.as_ref().ok_or_else(|| AiError::NotConfigured {
            env_var: "HEALTHSYNC_AI_API_KEY".to_string(),
        })?;
        client.complete(Some(system), prompt).await
    }

    /// Up to three meals fitting within the remaining calories
    pub async fn meal_recommendations(
        &self,
        remaining_calories: f64,
        goals: &DailyGoals,
        prefs: &MealPreferences,
    ) -> Vec<MealRecommendation> {
        let result = async {
            let prompt = prompts::meals(remaining_calories, goals, prefs);
            let reply = self
                .ask("You are a helpful nutritionist. Always return valid JSON only.", &prompt)
                .await?;
            let mut meals: Vec<MealRecommendation> = extract_json_array(&reply)?;
            require_non_empty(&meals, "meal list")?;
            meals.truncate(MAX_MEAL_RECOMMENDATIONS);
            Ok::<_, AiError>(meals)
        }
        .await;
        or_fallback(result, "meal recommendations", || {
            fallback::meal_recommendations(remaining_calories)
        })
    }

    /// Up to three insights on today's data and recent averages
    pub async fn health_insights(
        &self,
        today: &DaySummary,
        goals: &DailyGoals,
        history: &[DaySummary],
    ) -> Vec<HealthInsight> {
        let result = async {
            let recent = &history[..history.len().min(INSIGHT_HISTORY_DAYS)];
            let prompt = prompts::insights(today, goals, recent);
            let reply = self
                .ask("You are a health analytics expert. Return only valid JSON.", &prompt)
                .await?;
            let mut insights: Vec<HealthInsight> = extract_json_array(&reply)?;
            require_non_empty(&insights, "insight list")?;
            insights.truncate(MAX_INSIGHTS);
            Ok::<_, AiError>(insights)
        }
        .await;
        or_fallback(result, "health insights", || {
            fallback::health_insights(today, goals)
        })
    }

    /// A workout plan; a plan without exercises is rejected
    pub async fn workout_plan(&self, prefs: &WorkoutPreferences) -> WorkoutPlan {
        let result = async {
            let reply = self
                .ask(
                    "You are a fitness trainer. Return only valid JSON.",
                    &prompts::workout(prefs),
                )
                .await?;
            let plan: WorkoutPlan = extract_json_object(&reply)?;
            require_non_empty(&plan.exercises, "exercise list")?;
            Ok::<_, AiError>(plan)
        }
        .await;
        or_fallback(result, "workout plan", || fallback::workout_plan(prefs))
    }

    /// Short encouraging line, at most ten words
    pub async fn greeting(&self, today: &DaySummary, goals: &DailyGoals) -> String {
        let result = async {
            let reply = self
                .ask(
                    "You are a positive health coach. Return only a short greeting message (max 10 words), no other text.",
                    &prompts::greeting(today, goals),
                )
                .await?;
            Ok::<_, AiError>(clean_greeting(&reply))
        }
        .await;
        or_fallback(result, "greeting", || fallback::greeting(today, goals))
    }

    /// Up to four actionable suggestions for the home screen
    pub async fn home_recommendations(&self, today: &DaySummary, goals: &DailyGoals) -> Vec<String> {
        let result = async {
            let reply = self
                .ask(
                    "You are a helpful health coach. Return only valid JSON array of recommendation strings.",
                    &prompts::home(today, goals),
                )
                .await?;
            let mut recs: Vec<String> = extract_json_array(&reply)?;
            recs.retain(|r| !r.trim().is_empty());
            require_non_empty(&recs, "recommendation list")?;
            recs.truncate(MAX_HOME_RECOMMENDATIONS);
            Ok::<_, AiError>(recs)
        }
        .await;
        or_fallback(result, "home recommendations", || {
            fallback::home_recommendations(today, goals)
        })
    }

    /// Free-form question, answered with an apology when the model is unreachable
    pub async fn chat(&self, message: &str, context: Option<&ChatContext>) -> String {
        let result = async {
            let prompt = match context {
                Some(ctx) => format!(
                    "{}\n\nUser's current health context:\n{}",
                    message,
                    serde_json::to_string_pretty(ctx).unwrap_or_default()
                ),
                None => message.to_string(),
            };
            self.ask(prompts::CHAT_SYSTEM, &prompt).await
        }
        .await;
        or_fallback(result, "chat", || fallback::CHAT_UNAVAILABLE.to_string())
    }

    /// Up to five completions of a partly typed US address.
    ///
    /// Needs a street longer than three characters or a city longer than two;
    /// otherwise no request is made. There is no local fallback.
    pub async fn address_suggestions(&self, partial: &PartialAddress) -> Vec<AddressSuggestion> {
        let long_enough = |v: &Option<String>, min: usize| {
            v.as_deref().is_some_and(|s| s.trim().chars().count() > min)
        };
        if !long_enough(&partial.street, 3) && !long_enough(&partial.city, 2) {
            return Vec::new();
        }

        let result = async {
            let reply = self
                .ask(
                    "You are an address completion assistant. Return only valid JSON array of address objects.",
                    &prompts::address(partial),
                )
                .await?;
            let suggestions: Vec<AddressSuggestion> = extract_json_array(&reply)?;
            Ok::<_, AiError>(
                suggestions
                    .into_iter()
                    .map(AddressSuggestion::with_full_address)
                    .take(MAX_ADDRESS_SUGGESTIONS)
                    .collect(),
            )
        }
        .await;
        or_fallback(result, "address suggestions", Vec::new)
    }
}

impl std::fmt::Debug for AiAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiAssistant")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Trim, strip surrounding quotes, cap at ten words
pub fn clean_greeting(reply: &str) -> String {
    let trimmed = reply.trim();
    let trimmed = trimmed.strip_prefix(['"', '\'']).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(['"', '\'']).unwrap_or(trimmed);

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() > MAX_GREETING_WORDS {
        format!("{}...", words[..MAX_GREETING_WORDS].join(" "))
    } else {
        trimmed.to_string()
    }
}

fn require_non_empty<T>(items: &[T], what: &str) -> Result<(), AiError> {
    if items.is_empty() {
        Err(ExtractError::Rejected(format!("empty {}", what)).into())
    } else {
        Ok(())
    }
}

fn or_fallback<T>(result: Result<T, AiError>, feature: &str, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(AiError::NotConfigured { .. }) => fallback(),
        Err(e) => {
            warn!(feature, error = %e, "AI request failed, using fallback");
            fallback()
        }
    }
}

mod prompts {
    use super::types::{MealPreferences, PartialAddress, WorkoutPreferences};
    use crate::goals::DailyGoals;
    use crate::models::DaySummary;

    pub const CHAT_SYSTEM: &str = "You are a helpful health and wellness AI assistant. Provide accurate, helpful, and encouraging health advice.\nAlways remind users to consult healthcare professionals for medical concerns.";

    fn percent(actual: f64, goal: f64) -> i64 {
        if goal == 0.0 {
            0
        } else {
            (actual / goal * 100.0).round() as i64
        }
    }

    fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
        let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    pub fn meals(remaining: f64, goals: &DailyGoals, prefs: &MealPreferences) -> String {
        let mut extra = String::new();
        if !prefs.dietary_restrictions.is_empty() {
            extra.push_str(&format!(
                "Dietary restrictions: {}\n",
                prefs.dietary_restrictions.join(", ")
            ));
        }
        if !prefs.favorite_foods.is_empty() {
            extra.push_str(&format!("Favorite foods: {}\n", prefs.favorite_foods.join(", ")));
        }

        format!(
            r#"Recommend 3 healthy meals that fit within {remaining:.0} remaining calories for today.

Daily calorie goal: {goal} calories
Remaining calories: {remaining:.0} calories
{extra}
For each meal give name, category (breakfast, lunch, dinner or snack), calories, protein, carbs and fat in grams, a short reason, 3-5 main ingredients and prepTime in minutes.

Return ONLY a JSON array, no other text:
[{{"name": "Meal Name", "category": "lunch", "calories": 350, "protein": 20, "carbs": 45, "fat": 10, "reason": "High protein and fiber", "ingredients": ["a", "b"], "prepTime": 10}}]"#,
            goal = goals.calories,
        )
    }

    pub fn insights(today: &DaySummary, goals: &DailyGoals, history: &[DaySummary]) -> String {
        let avg_steps = mean(history.iter().map(|d| f64::from(d.steps))).unwrap_or(f64::from(today.steps));
        let avg_sleep = mean(history.iter().map(|d| d.sleep)).unwrap_or(today.sleep);
        let avg_water = mean(history.iter().map(|d| f64::from(d.water))).unwrap_or(f64::from(today.water));

        format!(
            r#"Analyze this user's health data and give 3 key insights.

Today:
- Steps: {steps} (goal: {steps_goal})
- Sleep: {sleep} hours (goal: {sleep_goal} hours)
- Water: {water} oz (goal: {water_goal} oz)
- Calories: {calories} (goal: {calories_goal})
- BMI: {bmi:.1}
- Blood Pressure: {bp}

Recent averages:
- Steps: {avg_steps:.0}
- Sleep: {avg_sleep:.1} hours
- Water: {avg_water:.0} oz

Return ONLY a JSON array, no other text:
[{{"title": "Insight Title", "insight": "What the data shows", "recommendation": "Actionable recommendation", "priority": "high"}}]
priority is one of "high", "medium", "low"."#,
            steps = today.steps,
            steps_goal = goals.steps,
            sleep = today.sleep,
            sleep_goal = goals.sleep,
            water = today.water,
            water_goal = goals.water,
            calories = today.calories,
            calories_goal = goals.calories,
            bmi = today.bmi,
            bp = today.blood_pressure,
        )
    }

    pub fn workout(prefs: &WorkoutPreferences) -> String {
        let equipment = if prefs.equipment.is_empty() {
            "bodyweight only".to_string()
        } else {
            prefs.equipment.join(", ")
        };
        format!(
            r#"Create a personalized workout plan.

- Duration: {duration} minutes
- Difficulty: {difficulty}
- Focus: {focus}
- Equipment: {equipment}

Return ONLY a JSON object, no other text:
{{"name": "Plan Name", "duration": 30, "exercises": [{{"name": "Exercise", "sets": 3, "reps": 12, "duration": null, "rest": 60}}], "caloriesBurned": 250, "difficulty": "intermediate", "focus": "full body"}}
Use "duration" (minutes) instead of sets/reps for cardio exercises; rest is in seconds."#,
            duration = prefs.duration.unwrap_or(30),
            difficulty = prefs.difficulty.unwrap_or_default(),
            focus = prefs.focus.as_deref().unwrap_or("full body"),
        )
    }

    fn metrics_block(today: &DaySummary, goals: &DailyGoals, with_percent: bool) -> String {
        let pct = |actual: f64, goal: f64| {
            if with_percent {
                format!(" ({}%)", percent(actual, goal))
            } else {
                String::new()
            }
        };
        format!(
            "- Steps: {} / {} goal{}\n- Sleep: {} hours / {} hours goal{}\n- Water: {} oz / {} oz goal{}\n- Calories: {} / {} goal{}\n- Activity Level: {}%\n- Blood Sugar: {} mg/dL\n- BMI: {:.1}",
            today.steps,
            goals.steps,
            pct(f64::from(today.steps), f64::from(goals.steps)),
            today.sleep,
            goals.sleep,
            pct(today.sleep, goals.sleep),
            today.water,
            goals.water,
            pct(f64::from(today.water), f64::from(goals.water)),
            today.calories,
            goals.calories,
            pct(f64::from(today.calories), f64::from(goals.calories)),
            today.activity,
            today.blood_sugar,
            today.bmi,
        )
    }

    pub fn greeting(today: &DaySummary, goals: &DailyGoals) -> String {
        format!(
            "Write ONE short, positive greeting (10 words or fewer) reflecting these metrics.\n\n{}\n\nReturn ONLY the message text.",
            metrics_block(today, goals, true)
        )
    }

    pub fn home(today: &DaySummary, goals: &DailyGoals) -> String {
        format!(
            "Give 3-4 short, specific, encouraging recommendations (one sentence each) based on these metrics.\n\n{}\n\nReturn ONLY a JSON array of strings, no other text:\n[\"Recommendation 1\", \"Recommendation 2\"]",
            metrics_block(today, goals, false)
        )
    }

    pub fn address(partial: &PartialAddress) -> String {
        let field = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("(not provided)")
                .to_string()
        };
        format!(
            r#"Suggest 3-5 complete, realistic US addresses matching this partial input. Prefer the given city and state when present.

- Street: {}
- City: {}
- State: {}
- Zip Code: {}

Return ONLY a JSON array, no other text:
[{{"street": "123 Main Street", "city": "New York", "state": "New York", "zip": "10001", "fullAddress": "123 Main Street, New York, NY 10001"}}]"#,
            field(&partial.street),
            field(&partial.city),
            field(&partial.state),
            field(&partial.zip),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Replays canned replies and records prompts
    struct ScriptedClient {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatCompletionClient for ScriptedClient {
        async fn complete(&self, _system: Option<&str>, prompt: &str) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|_| AiError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn today() -> DaySummary {
        DaySummary::fresh(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap())
    }

    #[test]
    fn test_clean_greeting() {
        assert_eq!(clean_greeting("  \"Keep going strong!\"\n"), "Keep going strong!");
        assert_eq!(
            clean_greeting("one two three four five six seven eight nine ten eleven"),
            "one two three four five six seven eight nine ten..."
        );
    }

    #[tokio::test]
    async fn test_offline_uses_fallbacks() {
        let ai = AiAssistant::offline();
        let goals = DailyGoals::default();
        assert!(!ai.is_configured());
        let meals = ai
            .meal_recommendations(520.0, &goals, &MealPreferences::default())
            .await;
        assert_eq!(meals.len(), 2);
        assert_eq!(
            ai.home_recommendations(&today(), &goals).await,
            crate::insights::recommendations(&today(), &goals)
        );
        assert_eq!(ai.chat("hi", None).await, fallback::CHAT_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_home_recommendations_capped() {
        let client = ScriptedClient::ok(r#"Here: ["a", "b", "c", "d", "e"]"#);
        let ai = AiAssistant::new(client);
        let recs = ai.home_recommendations(&today(), &DailyGoals::default()).await;
        assert_eq!(recs, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_workout_without_exercises_falls_back() {
        let client = ScriptedClient::ok(
            r#"{"name": "Empty", "duration": 20, "exercises": [], "caloriesBurned": 0, "difficulty": "beginner", "focus": "none"}"#,
        );
        let ai = AiAssistant::new(client);
        let plan = ai.workout_plan(&WorkoutPreferences::default()).await;
        assert_eq!(plan.name, "Full Body Workout");
    }

    #[tokio::test]
    async fn test_failed_call_falls_back() {
        let ai = AiAssistant::new(ScriptedClient::failing());
        let greeting = ai.greeting(&today(), &DailyGoals::default()).await;
        assert_eq!(greeting, "Keep working towards your health goals today!");
    }

    #[tokio::test]
    async fn test_address_rules() {
        let client = ScriptedClient::ok(
            r#"[{"street": "12 Oak St", "city": "Austin", "state": "TX", "zip": "78701"}]"#,
        );
        let ai = AiAssistant::new(client.clone());

        let short = PartialAddress {
            street: Some("12".to_string()),
            city: Some("NY".to_string()),
            ..Default::default()
        };
        assert!(ai.address_suggestions(&short).await.is_empty());
        assert!(client.prompts.lock().unwrap().is_empty());

        let partial = PartialAddress {
            street: Some("12 Oak".to_string()),
            ..Default::default()
        };
        let suggestions = ai.address_suggestions(&partial).await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].full_address, "12 Oak St, Austin, TX 78701");
        assert!(client.prompts.lock().unwrap()[0].contains("City: (not provided)"));
    }

    #[tokio::test]
    async fn test_chat_includes_context() {
        let client = ScriptedClient::ok("Drink more water.");
        let ai = AiAssistant::new(client.clone());
        let ctx = ChatContext {
            current_health_data: today(),
            goals: DailyGoals::default(),
        };
        assert_eq!(ai.chat("How am I doing?", Some(&ctx)).await, "Drink more water.");
        let prompt = client.prompts.lock().unwrap()[0].clone();
        assert!(prompt.starts_with("How am I doing?"));
        assert!(prompt.contains("\"currentHealthData\""));
    }
}
