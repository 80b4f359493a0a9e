use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::plan::dto::GeneratedDietPlan;
use crate::storage::{keys, StorageClient};

/// Bump when the cached blob shape changes; readers treat an unknown
/// version as a cache miss instead of guessing.
pub const PLAN_CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedPlanEnvelope {
    schema_version: u32,
    plan: GeneratedDietPlan,
}

/// Single-slot mirror of the currently active plan, kept in local storage
/// so the dashboard and meal-plan views can read it without a network round
/// trip. Non-authoritative: staleness is accepted by design, and a fresher
/// plan from another session is not seen until `set_active` runs here.
#[derive(Clone)]
pub struct PlanSyncCache {
    storage: Arc<dyn StorageClient>,
}

impl PlanSyncCache {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self { storage }
    }

    /// Overwrites any previously cached plan unconditionally and stamps the
    /// sync time. The cache is a mirror; a write failure is logged and the
    /// previous contents stand.
    pub fn set_active(&self, plan: &GeneratedDietPlan) {
        let envelope = CachedPlanEnvelope {
            schema_version: PLAN_CACHE_SCHEMA_VERSION,
            plan: plan.clone(),
        };
        let blob = match serde_json::to_string(&envelope) {
            Ok(blob) => blob,
            Err(e) => {
                error!(error = %e, "active plan did not serialize; cache left untouched");
                return;
            }
        };
        self.storage.set(keys::DIET_PLAN, &blob);
        if let Ok(stamp) = OffsetDateTime::now_utc().format(&Rfc3339) {
            self.storage.set(keys::DIET_PLAN_SYNC_DATE, &stamp);
        }
    }

    pub fn get_active(&self) -> Option<GeneratedDietPlan> {
        let blob = self.storage.get(keys::DIET_PLAN)?;
        match serde_json::from_str::<CachedPlanEnvelope>(&blob) {
            Ok(envelope) if envelope.schema_version == PLAN_CACHE_SCHEMA_VERSION => {
                Some(envelope.plan)
            }
            Ok(envelope) => {
                warn!(
                    found = envelope.schema_version,
                    expected = PLAN_CACHE_SCHEMA_VERSION,
                    "cached plan has an unknown schema version; treating as miss"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "cached plan blob is unreadable; treating as miss");
                None
            }
        }
    }

    pub fn synced_at(&self) -> Option<OffsetDateTime> {
        let stamp = self.storage.get(keys::DIET_PLAN_SYNC_DATE)?;
        OffsetDateTime::parse(&stamp, &Rfc3339).ok()
    }

    pub fn clear(&self) {
        self.storage.remove(keys::DIET_PLAN);
        self.storage.remove(keys::DIET_PLAN_SYNC_DATE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::fixtures::sample_plan;
    use crate::storage::MemoryStorage;

    fn cache() -> PlanSyncCache {
        PlanSyncCache::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn empty_cache_reads_as_none() {
        let cache = cache();
        assert!(cache.get_active().is_none());
        assert!(cache.synced_at().is_none());
    }

    #[test]
    fn set_active_overwrites_the_single_slot() {
        let cache = cache();
        let plan_a = sample_plan(Some("plan-a"));
        let plan_b = sample_plan(Some("plan-b"));

        cache.set_active(&plan_a);
        assert_eq!(
            cache.get_active().and_then(|p| p.id).as_deref(),
            Some("plan-a")
        );

        cache.set_active(&plan_b);
        let current = cache.get_active().expect("cached plan");
        assert_eq!(current.id.as_deref(), Some("plan-b"), "no merge, last write wins");
        assert!(cache.synced_at().is_some());
    }

    #[test]
    fn unknown_schema_version_is_a_miss() {
        let storage = Arc::new(MemoryStorage::new());
        let cache = PlanSyncCache::new(storage.clone());
        cache.set_active(&sample_plan(Some("plan-a")));

        let blob = storage.get(keys::DIET_PLAN).expect("blob");
        storage.set(
            keys::DIET_PLAN,
            &blob.replace(r#""schemaVersion":1"#, r#""schemaVersion":99"#),
        );
        assert!(cache.get_active().is_none());
    }

    #[test]
    fn corrupt_blob_is_a_miss() {
        let storage = Arc::new(MemoryStorage::new());
        let cache = PlanSyncCache::new(storage.clone());
        storage.set(keys::DIET_PLAN, "{truncated");
        assert!(cache.get_active().is_none());
    }

    #[test]
    fn clear_removes_plan_and_stamp() {
        let cache = cache();
        cache.set_active(&sample_plan(Some("plan-a")));
        cache.clear();
        assert!(cache.get_active().is_none());
        assert!(cache.synced_at().is_none());
    }
}
