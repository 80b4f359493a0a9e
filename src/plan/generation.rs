use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::api::GenerationApi;
use crate::error::WorkflowError;
use crate::health::dto::HealthEntry;
use crate::plan::dto::{GeneratePlanRequest, GeneratedDietPlan, UserPreferences};

/// The fixed progress sequence shown while a plan is being generated. Each
/// phase is displayed for a minimum duration regardless of how fast the
/// server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    ModelThink,
    AiAnalysis,
    HealthReport,
    DietPlan,
}

impl GenerationPhase {
    pub const SEQUENCE: [GenerationPhase; 4] = [
        GenerationPhase::ModelThink,
        GenerationPhase::AiAnalysis,
        GenerationPhase::HealthReport,
        GenerationPhase::DietPlan,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GenerationPhase::ModelThink => "Model Think",
            GenerationPhase::AiAnalysis => "AI Analysis",
            GenerationPhase::HealthReport => "Health Report",
            GenerationPhase::DietPlan => "Diet Plan",
        }
    }
}

pub struct PlanGenerationClient {
    api: Arc<dyn GenerationApi>,
    phase_min: Duration,
}

impl PlanGenerationClient {
    pub fn new(api: Arc<dyn GenerationApi>, phase_min: Duration) -> Self {
        Self { api, phase_min }
    }

    pub async fn generate(
        &self,
        entry: &HealthEntry,
        preferences: &UserPreferences,
    ) -> Result<GeneratedDietPlan, WorkflowError> {
        self.generate_with_progress(entry, preferences, |_| {}).await
    }

    /// Runs the network call and the phase sequence concurrently and yields
    /// only once both have completed: total wait is max(network, animation).
    /// Dropping the returned future cancels the in-flight request; no state
    /// is touched before the join resolves.
    pub async fn generate_with_progress(
        &self,
        entry: &HealthEntry,
        preferences: &UserPreferences,
        mut on_phase: impl FnMut(GenerationPhase),
    ) -> Result<GeneratedDietPlan, WorkflowError> {
        let request = GeneratePlanRequest {
            health_data: entry.clone(),
            user_preferences: preferences.clone(),
        };

        let phases = async {
            for phase in GenerationPhase::SEQUENCE {
                debug!(phase = phase.label(), "generation phase");
                on_phase(phase);
                tokio::time::sleep(self.phase_min).await;
            }
        };

        let (outcome, ()) = tokio::join!(self.api.generate_plan(&request), phases);
        outcome
    }
}
