use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;

use crate::api::AnalyticsApi;
use crate::dashboard::checkup::next_checkup;
use crate::dashboard::dto::DashboardSnapshot;
use crate::error::WorkflowError;
use crate::plan::cache::PlanSyncCache;
use crate::storage::{load_user_data, StorageClient};

/// Combines remote aggregate stats with locally-held state (cached plan,
/// checkup dates from the session blob) into one dashboard read.
pub struct DashboardAggregator {
    api: Arc<dyn AnalyticsApi>,
    cache: PlanSyncCache,
    storage: Arc<dyn StorageClient>,
    checkup_interval_days: i64,
}

impl DashboardAggregator {
    pub fn new(
        api: Arc<dyn AnalyticsApi>,
        cache: PlanSyncCache,
        storage: Arc<dyn StorageClient>,
        checkup_interval_days: i64,
    ) -> Self {
        Self {
            api,
            cache,
            storage,
            checkup_interval_days,
        }
    }

    pub async fn refresh(&self) -> Result<DashboardSnapshot, WorkflowError> {
        let stats = self.api.dashboard_stats().await?;
        let user = load_user_data(self.storage.as_ref());
        let now = OffsetDateTime::now_utc();

        // A present cached plan counts as "active" without re-validating
        // against the server.
        let has_active_plan = self.cache.get_active().is_some();

        Ok(DashboardSnapshot {
            nutrition_score: stats.nutrition_score,
            meal_completion: stats.meal_completion,
            next_checkup: next_checkup(
                user.as_ref().and_then(|u| u.last_checkup_date),
                user.as_ref().and_then(|u| u.due_date),
                now.date(),
                self.checkup_interval_days,
            ),
            has_active_plan,
            refreshed_at: now,
        })
    }

    /// Tab-visibility hook: regaining the foreground fires a refresh.
    /// Overlapping refreshes are not deduplicated; every event is its own
    /// fetch.
    pub async fn on_visibility_change(
        &self,
        visible: bool,
    ) -> Option<Result<DashboardSnapshot, WorkflowError>> {
        if !visible {
            return None;
        }
        debug!("visibility regained; refreshing dashboard");
        Some(self.refresh().await)
    }
}
