use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::tracking::dto::MealTrackingSummary;

/// Remote half of the dashboard, from `GET /api/analytics/dashboard`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub nutrition_score: f64,
    pub meal_completion: MealTrackingSummary,
}

/// Where the user stands relative to their next routine checkup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CheckupStatus {
    /// Next checkup scheduled from the last one.
    Upcoming { date: Date, days_left: i64 },
    /// The computed next checkup date is already in the past.
    Overdue { date: Date },
    /// No checkup on record; counting down to the due date instead.
    DueDateCountdown { due_date: Date, days_left: i64 },
    NotScheduled,
}

/// Everything the dashboard renders in one read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub nutrition_score: f64,
    pub meal_completion: MealTrackingSummary,
    pub next_checkup: CheckupStatus,
    pub has_active_plan: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub refreshed_at: OffsetDateTime,
}
