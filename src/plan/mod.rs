pub mod cache;
pub mod dto;
pub mod generation;
pub mod persistence;

pub use cache::{PlanSyncCache, PLAN_CACHE_SCHEMA_VERSION};
pub use dto::{GeneratedDietPlan, UserPreferences};
pub use generation::{GenerationPhase, PlanGenerationClient};
pub use persistence::{PersistenceOutcome, PlanPersistenceClient};

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;

    use time::OffsetDateTime;

    use super::dto::{DailyTargets, DayMeals, GeneratedDietPlan, Meal, NutritionalInsights};

    pub fn meal(name: &str, calories: f64) -> Meal {
        Meal {
            name: name.to_string(),
            calories,
            description: None,
        }
    }

    pub fn sample_plan(id: Option<&str>) -> GeneratedDietPlan {
        let mut weekly_meal_plan = BTreeMap::new();
        for day in [
            "monday",
            "tuesday",
            "wednesday",
            "thursday",
            "friday",
            "saturday",
            "sunday",
        ] {
            weekly_meal_plan.insert(
                day.to_string(),
                DayMeals {
                    breakfast: meal("Oats porridge with almonds", 320.0),
                    lunch: meal("Spinach dal with rice", 540.0),
                    dinner: meal("Vegetable khichdi", 480.0),
                    snacks: vec![meal("Fruit and yogurt", 180.0)],
                },
            );
        }
        GeneratedDietPlan {
            id: id.map(str::to_string),
            user_id: None,
            health_entry_id: None,
            generated_at: OffsetDateTime::now_utc(),
            overall_score: 82,
            recommendations: vec!["Increase iron-rich foods".to_string()],
            nutritional_insights: NutritionalInsights {
                strengths: vec!["Good hydration".to_string()],
                concerns: vec!["Low hemoglobin".to_string()],
                priorities: vec!["Iron intake".to_string()],
            },
            weekly_meal_plan,
            supplements: vec!["Iron + folate".to_string()],
            restrictions: vec![],
            daily_targets: DailyTargets {
                calories: 2200.0,
                protein: 75.0,
                iron: 27.0,
                calcium: 1000.0,
                folate: 600.0,
                vitamin_d: 600.0,
            },
        }
    }
}
