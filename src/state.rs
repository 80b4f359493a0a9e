use std::sync::Arc;

use crate::api::{AnalyticsApi, GenerationApi, HttpApi, PersistenceApi};
use crate::config::AppConfig;
use crate::dashboard::aggregator::DashboardAggregator;
use crate::plan::cache::PlanSyncCache;
use crate::storage::{MemoryStorage, StorageClient};

/// Shared application state: configuration plus the injected ports. All
/// workflow components hang off this.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub generation: Arc<dyn GenerationApi>,
    pub persistence: Arc<dyn PersistenceApi>,
    pub analytics: Arc<dyn AnalyticsApi>,
}

impl AppState {
    /// Environment-configured state with the real HTTP API behind every
    /// port and an in-memory local store.
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let storage: Arc<dyn StorageClient> = Arc::new(MemoryStorage::new());
        let api = Arc::new(HttpApi::new(config.api_base_url.clone(), storage.clone()));
        Ok(Self {
            config,
            storage,
            generation: api.clone(),
            persistence: api.clone(),
            analytics: api,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageClient>,
        generation: Arc<dyn GenerationApi>,
        persistence: Arc<dyn PersistenceApi>,
        analytics: Arc<dyn AnalyticsApi>,
    ) -> Self {
        Self {
            config,
            storage,
            generation,
            persistence,
            analytics,
        }
    }

    pub fn plan_cache(&self) -> PlanSyncCache {
        PlanSyncCache::new(self.storage.clone())
    }

    pub fn dashboard(&self) -> DashboardAggregator {
        DashboardAggregator::new(
            self.analytics.clone(),
            self.plan_cache(),
            self.storage.clone(),
            self.config.checkup_interval_days,
        )
    }
}
