use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

/// Body of `POST /api/analytics/meals/complete`. The server upserts by
/// (planId, mealType, date), so repeated calls converge to one record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMealRequest {
    pub plan_id: String,
    pub meal_type: MealType,
    pub meal_name: String,
    pub date: Date,
    pub calories_consumed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Aggregate counts from `GET /api/analytics/meals/tracking?planId=`.
/// The server is the source of truth for these; the client never increments
/// them locally.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealTrackingSummary {
    pub total_meals: u32,
    pub completed_meals: u32,
    pub completion_rate: f64,
    pub today_meals: u32,
    pub today_completed: u32,
}
