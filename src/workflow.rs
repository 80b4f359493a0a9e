use std::sync::Arc;
use std::time::Duration;

use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::health::form::{FieldUpdate, FormStep, FormVariant, HealthEntryForm};
use crate::plan::cache::PlanSyncCache;
use crate::plan::dto::UserPreferences;
use crate::plan::generation::{GenerationPhase, PlanGenerationClient};
use crate::plan::persistence::{PersistenceOutcome, PlanPersistenceClient};
use crate::state::AppState;
use crate::storage::{load_user_data, StorageClient};
use crate::tracking::dto::MealType;
use crate::tracking::tracker::MealCompletionTracker;

/// Where a workflow run currently stands. Terminal states are `Synced`
/// (entry-only path) and `Tracked` (after at least one completion event);
/// failures while submitting or generating fall back to `Collecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Idle,
    Collecting { step: FormStep },
    Submitting,
    Generating,
    Generated,
    Persisted,
    Synced,
    Tracked,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// `submit(false)`: the health entry was persisted and the run ended.
    EntrySaved { health_entry_id: String },
    /// `submit(true)`: a plan was generated; the outcome says whether it
    /// was also durably saved.
    PlanGenerated(PersistenceOutcome),
}

/// Orchestrates one pass from raw health-entry data to a displayed,
/// persisted and locally-cached diet plan, plus completion tracking.
pub struct DietPlanWorkflow {
    run_id: Uuid,
    stage: WorkflowStage,
    form: HealthEntryForm,
    generation: PlanGenerationClient,
    persistence: PlanPersistenceClient,
    cache: PlanSyncCache,
    tracker: MealCompletionTracker,
    storage: Arc<dyn StorageClient>,
    last_error: Option<String>,
}

impl DietPlanWorkflow {
    pub fn new(state: &AppState, variant: FormVariant) -> Self {
        Self::with_form(state, HealthEntryForm::new(variant))
    }

    /// Start from a pre-filled form (CLI input, resumed draft).
    pub fn with_form(state: &AppState, form: HealthEntryForm) -> Self {
        let cache = state.plan_cache();
        Self {
            run_id: Uuid::new_v4(),
            stage: WorkflowStage::Idle,
            form,
            generation: PlanGenerationClient::new(
                state.generation.clone(),
                Duration::from_millis(state.config.phase_min_ms),
            ),
            persistence: PlanPersistenceClient::new(state.persistence.clone()),
            tracker: MealCompletionTracker::new(
                state.analytics.clone(),
                cache.clone(),
                state.storage.clone(),
            ),
            cache,
            storage: state.storage.clone(),
            last_error: None,
        }
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn form(&self) -> &HealthEntryForm {
        &self.form
    }

    pub fn tracker(&self) -> &MealCompletionTracker {
        &self.tracker
    }

    pub fn begin(&mut self) {
        if self.stage == WorkflowStage::Idle {
            self.stage = WorkflowStage::Collecting {
                step: self.form.step(),
            };
        }
    }

    pub fn apply(&mut self, update: FieldUpdate) {
        self.begin();
        self.form.apply(update);
    }

    pub fn set_ai_opt_in(&mut self, enabled: bool) {
        self.form.set_ai_opt_in(enabled);
    }

    pub fn next(&mut self) {
        self.begin();
        self.form.next();
        self.stage = WorkflowStage::Collecting {
            step: self.form.step(),
        };
    }

    pub fn previous(&mut self) {
        self.begin();
        self.form.previous();
        self.stage = WorkflowStage::Collecting {
            step: self.form.step(),
        };
    }

    pub async fn submit(
        &mut self,
        generate: bool,
        preferences: &UserPreferences,
    ) -> Result<SubmitOutcome, WorkflowError> {
        self.submit_with_progress(generate, preferences, |_| {})
            .await
    }

    /// `submit(false)` persists the entry only. `submit(true)` persists the
    /// entry, generates a plan (joined with the phase animation), saves the
    /// plan against the entry and mirrors it into the local cache. An
    /// entry-save failure in the generate path does not stop generation;
    /// it only downgrades persistence to a reported skip.
    pub async fn submit_with_progress(
        &mut self,
        generate: bool,
        preferences: &UserPreferences,
        on_phase: impl FnMut(GenerationPhase),
    ) -> Result<SubmitOutcome, WorkflowError> {
        if !matches!(
            self.stage,
            WorkflowStage::Idle | WorkflowStage::Collecting { .. }
        ) {
            return Err(WorkflowError::validation(
                "No form is being collected; nothing to submit",
            ));
        }
        if let Err(e) = self.form.validate_for_submit(generate) {
            self.fail_back(&e);
            return Err(e);
        }

        let user_id = load_user_data(self.storage.as_ref()).map(|u| u.user_id);
        let entry = self.form.finalize(user_id);
        self.stage = WorkflowStage::Submitting;
        info!(run_id = %self.run_id, generate, "submitting health entry");

        if !generate {
            return match self.persistence.save_health_entry(&entry).await {
                Ok(saved) => {
                    self.stage = WorkflowStage::Synced;
                    Ok(SubmitOutcome::EntrySaved {
                        health_entry_id: saved.id,
                    })
                }
                Err(e) => {
                    self.fail_back(&e);
                    Err(e)
                }
            };
        }

        let entry_saved = self.persistence.save_health_entry(&entry).await;

        self.stage = WorkflowStage::Generating;
        let plan = match self
            .generation
            .generate_with_progress(&entry, preferences, on_phase)
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                self.fail_back(&e);
                return Err(e);
            }
        };
        self.stage = WorkflowStage::Generated;

        let outcome = match entry_saved {
            Ok(saved) => {
                let outcome = self.persistence.save_plan_for_entry(plan, &saved.id).await;
                if outcome.is_saved() {
                    self.stage = WorkflowStage::Persisted;
                }
                outcome
            }
            Err(e) => {
                warn!(run_id = %self.run_id, error = %e, "health entry save failed; plan save skipped");
                PersistenceOutcome::skipped_without_entry(plan, e.to_string())
            }
        };

        self.cache.set_active(outcome.plan());
        self.stage = WorkflowStage::Synced;
        info!(run_id = %self.run_id, persisted = outcome.is_saved(), "plan synced to local cache");
        Ok(SubmitOutcome::PlanGenerated(outcome))
    }

    pub async fn mark_meal_completed(
        &mut self,
        meal_type: MealType,
        meal_name: &str,
        date: Date,
        calories_consumed: f64,
        notes: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.tracker
            .mark_completed(meal_type, meal_name, date, calories_consumed, notes)
            .await?;
        self.stage = WorkflowStage::Tracked;
        Ok(())
    }

    fn fail_back(&mut self, e: &WorkflowError) {
        self.last_error = Some(e.to_string());
        self.stage = WorkflowStage::Collecting {
            step: self.form.step(),
        };
    }
}
