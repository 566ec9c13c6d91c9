//! Deterministic answers used when the model is unavailable or unusable

use super::types::{
    HealthInsight, InsightPriority, MealRecommendation, PlannedExercise, WorkoutPlan,
    WorkoutPreferences,
};
use crate::goals::DailyGoals;
use crate::insights;
use crate::journal::MealType;
use crate::models::DaySummary;

pub const CHAT_UNAVAILABLE: &str = "I'm having trouble connecting right now. Please try again later or consult with a healthcare professional for immediate concerns.";

/// Share of a goal that counts as "close" for greetings and insights
const NEAR_GOAL: f64 = 0.8;
const CALORIE_CEILING: f64 = 1.2;

pub fn meal_recommendations(remaining_calories: f64) -> Vec<MealRecommendation> {
    vec![
        MealRecommendation {
            name: "Grilled Chicken Salad".to_string(),
            category: MealType::Lunch,
            calories: remaining_calories.min(400.0),
            protein: 35.0,
            carbs: 25.0,
            fat: 15.0,
            reason: "High protein, low calorie option".to_string(),
            ingredients: vec![
                "Grilled chicken".to_string(),
                "Mixed greens".to_string(),
                "Cherry tomatoes".to_string(),
                "Olive oil dressing".to_string(),
            ],
            prep_time: 15.0,
        },
        MealRecommendation {
            name: "Greek Yogurt with Berries".to_string(),
            category: MealType::Snack,
            calories: remaining_calories.min(200.0),
            protein: 15.0,
            carbs: 25.0,
            fat: 5.0,
            reason: "Protein-rich snack to keep you full".to_string(),
            ingredients: vec![
                "Greek yogurt".to_string(),
                "Mixed berries".to_string(),
                "Honey".to_string(),
            ],
            prep_time: 5.0,
        },
    ]
}

pub fn health_insights(today: &DaySummary, goals: &DailyGoals) -> Vec<HealthInsight> {
    let mut out = Vec::new();

    if f64::from(today.steps) < f64::from(goals.steps) * NEAR_GOAL {
        out.push(HealthInsight {
            title: "Step Count Below Target".to_string(),
            insight: format!(
                "You're at {} steps, below your {} goal.",
                today.steps, goals.steps
            ),
            recommendation: "Try a 10-minute walk to boost your daily steps.".to_string(),
            priority: InsightPriority::Medium,
        });
    }

    if today.sleep < goals.sleep {
        out.push(HealthInsight {
            title: "Sleep Duration".to_string(),
            insight: format!(
                "You got {} hours of sleep, below your {} hour goal.",
                today.sleep, goals.sleep
            ),
            recommendation: "Aim for consistent sleep schedule to improve rest quality."
                .to_string(),
            priority: InsightPriority::High,
        });
    }

    if f64::from(today.water) < f64::from(goals.water) * NEAR_GOAL {
        out.push(HealthInsight {
            title: "Hydration Level".to_string(),
            insight: format!(
                "You've consumed {} oz of water, below your {} oz goal.",
                today.water, goals.water
            ),
            recommendation: "Drink water regularly throughout the day to stay hydrated."
                .to_string(),
            priority: InsightPriority::Medium,
        });
    }

    if out.is_empty() {
        out.push(HealthInsight {
            title: "Great Progress!".to_string(),
            insight: "You're doing well with your health goals.".to_string(),
            recommendation: "Keep up the good work and maintain consistency.".to_string(),
            priority: InsightPriority::Low,
        });
    }
    out
}

pub fn workout_plan(prefs: &WorkoutPreferences) -> WorkoutPlan {
    let cardio = |name: &str, minutes: f64, rest: u32| PlannedExercise {
        name: name.to_string(),
        sets: None,
        reps: None,
        duration: Some(minutes),
        rest: Some(rest),
    };
    let strength = |name: &str, sets: u32, reps: u32| PlannedExercise {
        name: name.to_string(),
        sets: Some(sets),
        reps: Some(reps),
        duration: None,
        rest: Some(45),
    };

    WorkoutPlan {
        name: "Full Body Workout".to_string(),
        duration: prefs.duration.unwrap_or(30),
        exercises: vec![
            cardio("Jumping Jacks", 2.0, 30),
            strength("Push-ups", 3, 10),
            strength("Squats", 3, 15),
            cardio("Plank", 1.0, 30),
            strength("Lunges", 2, 12),
        ],
        calories_burned: 200.0,
        difficulty: prefs.difficulty.unwrap_or_default(),
        focus: prefs
            .focus
            .clone()
            .unwrap_or_else(|| "full body".to_string()),
    }
}

pub fn greeting(today: &DaySummary, goals: &DailyGoals) -> String {
    let calories = f64::from(today.calories);
    let calorie_goal = f64::from(goals.calories);
    let progress = [
        f64::from(today.steps) >= f64::from(goals.steps) * NEAR_GOAL,
        f64::from(today.water) >= f64::from(goals.water) * NEAR_GOAL,
        today.sleep >= goals.sleep * NEAR_GOAL,
        calories >= calorie_goal * NEAR_GOAL && calories <= calorie_goal * CALORIE_CEILING,
    ]
    .iter()
    .filter(|met| **met)
    .count();

    match progress {
        n if n >= 3 => "Your health metrics look great today!",
        2 => "You are making good progress on your goals!",
        _ => "Keep working towards your health goals today!",
    }
    .to_string()
}

pub fn home_recommendations(today: &DaySummary, goals: &DailyGoals) -> Vec<String> {
    insights::recommendations(today, goals)
}
