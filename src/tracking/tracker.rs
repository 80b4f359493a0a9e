use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use time::{Date, OffsetDateTime};
use tracing::info;

use crate::api::AnalyticsApi;
use crate::error::WorkflowError;
use crate::plan::cache::PlanSyncCache;
use crate::storage::{keys, StorageClient};
use crate::tracking::dto::{CompleteMealRequest, MealTrackingSummary, MealType};

/// Records per-meal-type completion events against the active plan.
///
/// The local completed set exists only to disable the "mark complete"
/// control for the current day; aggregate metrics always come back from the
/// server via `tracking_summary`.
pub struct MealCompletionTracker {
    api: Arc<dyn AnalyticsApi>,
    cache: PlanSyncCache,
    storage: Arc<dyn StorageClient>,
    completed_today: Mutex<(Date, HashSet<MealType>)>,
}

impl MealCompletionTracker {
    pub fn new(
        api: Arc<dyn AnalyticsApi>,
        cache: PlanSyncCache,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            api,
            cache,
            storage,
            completed_today: Mutex::new((OffsetDateTime::now_utc().date(), HashSet::new())),
        }
    }

    /// Upserts a completion record for (active plan, meal type, date).
    /// Requires a signed-in session and an active cached plan.
    pub async fn mark_completed(
        &self,
        meal_type: MealType,
        meal_name: &str,
        date: Date,
        calories_consumed: f64,
        notes: Option<String>,
    ) -> Result<(), WorkflowError> {
        if self.storage.get(keys::AUTH_TOKEN).is_none() {
            return Err(WorkflowError::Unauthenticated);
        }
        let plan = self.cache.get_active().ok_or(WorkflowError::NoActivePlan)?;
        let plan_id = plan.id.ok_or(WorkflowError::NoActivePlan)?;

        let request = CompleteMealRequest {
            plan_id: plan_id.clone(),
            meal_type,
            meal_name: meal_name.to_string(),
            date,
            calories_consumed,
            notes,
        };
        self.api.complete_meal(&request).await?;
        info!(plan_id = %plan_id, meal_type = meal_type.as_str(), %date, "meal marked completed");

        if date == OffsetDateTime::now_utc().date() {
            let mut today = self.completed_today.lock().expect("completed set lock");
            if today.0 != date {
                // Day rolled over since the set was last touched.
                *today = (date, HashSet::new());
            }
            today.1.insert(meal_type);
        }
        Ok(())
    }

    /// Whether the control for this meal type should be disabled today.
    /// Optimistic local state only; not a substitute for server counts.
    pub fn is_completed_today(&self, meal_type: MealType) -> bool {
        let today = self.completed_today.lock().expect("completed set lock");
        today.0 == OffsetDateTime::now_utc().date() && today.1.contains(&meal_type)
    }

    /// Re-fetch aggregate counts for the plan; the server is the source of
    /// truth after every write.
    pub async fn tracking_summary(
        &self,
        plan_id: &str,
    ) -> Result<MealTrackingSummary, WorkflowError> {
        self.api.meal_tracking(plan_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GENERIC_FAILURE;
    use crate::dashboard::dto::DashboardStats;
    use crate::plan::fixtures::sample_plan;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Records completions keyed the way the server does, so idempotence is
    /// observable from the stored record count.
    #[derive(Default)]
    struct RecordingAnalyticsApi {
        records: Mutex<HashMap<(String, MealType, Date), (f64, Option<String>)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl AnalyticsApi for RecordingAnalyticsApi {
        async fn complete_meal(&self, request: &CompleteMealRequest) -> Result<(), WorkflowError> {
            if let Some(message) = &self.fail_with {
                return Err(WorkflowError::network(message.clone()));
            }
            self.records.lock().expect("records lock").insert(
                (request.plan_id.clone(), request.meal_type, request.date),
                (request.calories_consumed, request.notes.clone()),
            );
            Ok(())
        }

        async fn dashboard_stats(&self) -> Result<DashboardStats, WorkflowError> {
            Err(WorkflowError::network(GENERIC_FAILURE))
        }

        async fn meal_tracking(
            &self,
            plan_id: &str,
        ) -> Result<MealTrackingSummary, WorkflowError> {
            let records = self.records.lock().expect("records lock");
            let completed = records.keys().filter(|(p, _, _)| p == plan_id).count() as u32;
            Ok(MealTrackingSummary {
                total_meals: 21,
                completed_meals: completed,
                completion_rate: f64::from(completed) / 21.0,
                today_meals: 3,
                today_completed: completed.min(3),
            })
        }
    }

    fn tracker_with(
        api: Arc<RecordingAnalyticsApi>,
        signed_in: bool,
        with_plan: bool,
    ) -> MealCompletionTracker {
        let storage = Arc::new(MemoryStorage::new());
        if signed_in {
            storage.set(keys::AUTH_TOKEN, "tok");
        }
        let cache = PlanSyncCache::new(storage.clone());
        if with_plan {
            cache.set_active(&sample_plan(Some("plan-1")));
        }
        MealCompletionTracker::new(api, cache, storage)
    }

    fn today() -> Date {
        OffsetDateTime::now_utc().date()
    }

    #[tokio::test]
    async fn requires_authentication() {
        let api = Arc::new(RecordingAnalyticsApi::default());
        let tracker = tracker_with(api, false, true);
        let err = tracker
            .mark_completed(MealType::Breakfast, "Oats", today(), 320.0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Unauthenticated));
    }

    #[tokio::test]
    async fn requires_an_active_plan() {
        let api = Arc::new(RecordingAnalyticsApi::default());
        let tracker = tracker_with(api, true, false);
        let err = tracker
            .mark_completed(MealType::Breakfast, "Oats", today(), 320.0, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No active diet plan found");
    }

    #[tokio::test]
    async fn success_updates_the_local_today_set() {
        let api = Arc::new(RecordingAnalyticsApi::default());
        let tracker = tracker_with(api, true, true);

        assert!(!tracker.is_completed_today(MealType::Breakfast));
        tracker
            .mark_completed(MealType::Breakfast, "Oats", today(), 320.0, None)
            .await
            .expect("mark completed");
        assert!(tracker.is_completed_today(MealType::Breakfast));
        assert!(!tracker.is_completed_today(MealType::Lunch));
    }

    #[tokio::test]
    async fn re_marking_upserts_to_a_single_record_with_latest_values() {
        let api = Arc::new(RecordingAnalyticsApi::default());
        let tracker = tracker_with(api.clone(), true, true);

        tracker
            .mark_completed(MealType::Lunch, "Dal rice", today(), 540.0, None)
            .await
            .expect("first mark");
        tracker
            .mark_completed(
                MealType::Lunch,
                "Dal rice",
                today(),
                500.0,
                Some("smaller portion".into()),
            )
            .await
            .expect("second mark is not an error");

        let records = api.records.lock().expect("records lock");
        assert_eq!(records.len(), 1);
        let (calories, notes) = &records[&("plan-1".to_string(), MealType::Lunch, today())];
        assert_eq!(*calories, 500.0);
        assert_eq!(notes.as_deref(), Some("smaller portion"));
    }

    #[tokio::test]
    async fn aggregate_counts_come_from_the_server() {
        let api = Arc::new(RecordingAnalyticsApi::default());
        let tracker = tracker_with(api, true, true);

        tracker
            .mark_completed(MealType::Breakfast, "Oats", today(), 320.0, None)
            .await
            .expect("mark");
        tracker
            .mark_completed(MealType::Dinner, "Khichdi", today(), 480.0, None)
            .await
            .expect("mark");

        let summary = tracker.tracking_summary("plan-1").await.expect("summary");
        assert_eq!(summary.completed_meals, 2);
        assert_eq!(summary.total_meals, 21);
    }

    #[tokio::test]
    async fn server_rejection_leaves_the_local_set_untouched() {
        let api = Arc::new(RecordingAnalyticsApi {
            fail_with: Some("duplicate write conflict".into()),
            ..Default::default()
        });
        let tracker = tracker_with(api, true, true);

        let err = tracker
            .mark_completed(MealType::Breakfast, "Oats", today(), 320.0, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "duplicate write conflict");
        assert!(!tracker.is_completed_today(MealType::Breakfast));
    }
}
