use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::health::dto::HealthEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayMeals {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
    #[serde(default)]
    pub snacks: Vec<Meal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NutritionalInsights {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyTargets {
    pub calories: f64,
    pub protein: f64,
    pub iron: f64,
    pub calcium: f64,
    pub folate: f64,
    pub vitamin_d: f64,
}

/// A generated diet plan as returned by the generation endpoint and stored
/// by the save endpoint. `weekly_meal_plan` is keyed by lowercase day name
/// ("monday" .. "sunday").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDietPlan {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_entry_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    /// 0..=100.
    pub overall_score: u8,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub nutritional_insights: NutritionalInsights,
    pub weekly_meal_plan: BTreeMap<String, DayMeals>,
    #[serde(default)]
    pub supplements: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub daily_targets: DailyTargets,
}

impl GeneratedDietPlan {
    pub fn day(&self, day: &str) -> Option<&DayMeals> {
        self.weekly_meal_plan.get(day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub cuisine_preference: Vec<String>,
    pub meal_count: u8,
    pub calorie_target: u32,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            cuisine_preference: Vec::new(),
            meal_count: 3,
            calorie_target: 2200,
        }
    }
}

/// Body of `POST /api/plans/generate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    pub health_data: HealthEntry,
    pub user_preferences: UserPreferences,
}

/// Body of `POST /api/plans/save`: the plan fields plus linkage/lifecycle
/// markers the server expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePlanRequest {
    #[serde(flatten)]
    pub plan: GeneratedDietPlan,
    pub health_entry_id: String,
    pub plan_type: String,
    pub status: String,
    pub is_active: bool,
}

impl SavePlanRequest {
    /// A freshly generated plan saved as the user's active plan.
    pub fn active(plan: GeneratedDietPlan, health_entry_id: String) -> Self {
        Self {
            plan,
            health_entry_id,
            plan_type: "ai_generated".to_string(),
            status: "active".to_string(),
            is_active: true,
        }
    }
}
