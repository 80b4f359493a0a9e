use std::sync::Arc;

use tracing::{info, warn};

use crate::api::PersistenceApi;
use crate::error::WorkflowError;
use crate::health::dto::{HealthEntry, SavedHealthEntry};
use crate::plan::dto::{GeneratedDietPlan, SavePlanRequest};

/// How a generated plan ended up relative to durable storage. The two saves
/// (health entry, then plan) are sequential and non-atomic; a skip is
/// reported explicitly rather than swallowed.
#[derive(Debug)]
pub enum PersistenceOutcome {
    Saved {
        health_entry_id: String,
        plan: GeneratedDietPlan,
    },
    /// The plan exists in memory only. `health_entry_id` is `None` when the
    /// entry save itself failed (so the plan save was never attempted).
    Skipped {
        health_entry_id: Option<String>,
        reason: String,
        plan: GeneratedDietPlan,
    },
}

impl PersistenceOutcome {
    pub fn skipped_without_entry(plan: GeneratedDietPlan, reason: impl Into<String>) -> Self {
        PersistenceOutcome::Skipped {
            health_entry_id: None,
            reason: reason.into(),
            plan,
        }
    }

    pub fn plan(&self) -> &GeneratedDietPlan {
        match self {
            PersistenceOutcome::Saved { plan, .. } => plan,
            PersistenceOutcome::Skipped { plan, .. } => plan,
        }
    }

    pub fn into_plan(self) -> GeneratedDietPlan {
        match self {
            PersistenceOutcome::Saved { plan, .. } => plan,
            PersistenceOutcome::Skipped { plan, .. } => plan,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, PersistenceOutcome::Saved { .. })
    }

    /// The error to surface when the plan was not durably saved.
    pub fn skip_error(&self) -> Option<WorkflowError> {
        match self {
            PersistenceOutcome::Saved { .. } => None,
            PersistenceOutcome::Skipped { reason, .. } => {
                Some(WorkflowError::PersistenceSkipped(reason.clone()))
            }
        }
    }
}

pub struct PlanPersistenceClient {
    api: Arc<dyn PersistenceApi>,
}

impl PlanPersistenceClient {
    pub fn new(api: Arc<dyn PersistenceApi>) -> Self {
        Self { api }
    }

    pub async fn save_health_entry(
        &self,
        entry: &HealthEntry,
    ) -> Result<SavedHealthEntry, WorkflowError> {
        let saved = self.api.save_health_entry(entry).await?;
        info!(health_entry_id = %saved.id, "health entry saved");
        Ok(saved)
    }

    /// Save a generated plan against an already-saved health entry, marking
    /// it as the user's active plan. A failure leaves the plan usable from
    /// memory; there is no compensating rollback of the entry.
    pub async fn save_plan_for_entry(
        &self,
        plan: GeneratedDietPlan,
        health_entry_id: &str,
    ) -> PersistenceOutcome {
        let request = SavePlanRequest::active(plan.clone(), health_entry_id.to_string());
        match self.api.save_plan(&request).await {
            Ok(stored) => {
                info!(plan_id = ?stored.id, health_entry_id, "diet plan saved");
                PersistenceOutcome::Saved {
                    health_entry_id: health_entry_id.to_string(),
                    plan: stored,
                }
            }
            Err(e) => {
                warn!(error = %e, health_entry_id, "plan save failed; keeping in-memory plan");
                PersistenceOutcome::Skipped {
                    health_entry_id: Some(health_entry_id.to_string()),
                    reason: e.to_string(),
                    plan,
                }
            }
        }
    }
}
