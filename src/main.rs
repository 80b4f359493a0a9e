use nutricare::health::form::{FormVariant, HealthEntryDraft, HealthEntryForm};
use nutricare::plan::dto::UserPreferences;
use nutricare::state::AppState;
use nutricare::storage::keys;
use nutricare::workflow::{DietPlanWorkflow, SubmitOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "nutricare=debug,reqwest=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init()?;

    // Seed the session the way the web client does at login.
    if let Ok(token) = std::env::var("NUTRICARE_AUTH_TOKEN") {
        state.storage.set(keys::AUTH_TOKEN, &token);
    }
    if let Ok(user_data) = std::env::var("NUTRICARE_USER_DATA") {
        state.storage.set(keys::USER_DATA, &user_data);
    }

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: nutricare <health-entry.json>"))?;
    let raw = std::fs::read_to_string(&path)?;
    let draft: HealthEntryDraft = serde_json::from_str(&raw)?;

    let mut form = HealthEntryForm::from_draft(FormVariant::HealthEntry, draft);
    form.set_ai_opt_in(true);
    tracing::info!(bmi = ?form.draft().bmi, "health entry loaded");

    let mut workflow = DietPlanWorkflow::with_form(&state, form);
    let outcome = workflow
        .submit_with_progress(true, &UserPreferences::default(), |phase| {
            tracing::info!(phase = phase.label(), "generating");
        })
        .await?;

    match outcome {
        SubmitOutcome::PlanGenerated(outcome) => {
            let plan = outcome.plan();
            tracing::info!(
                score = plan.overall_score,
                persisted = outcome.is_saved(),
                "diet plan ready"
            );
            if let Some(monday) = plan.day("monday") {
                tracing::info!(
                    breakfast = %monday.breakfast.name,
                    calories = monday.breakfast.calories,
                    "monday breakfast"
                );
            }
            if let Some(skip) = outcome.skip_error() {
                tracing::warn!(%skip, "plan is not durably saved");
            }
        }
        SubmitOutcome::EntrySaved { health_entry_id } => {
            tracing::info!(%health_entry_id, "health entry saved without plan generation");
        }
    }

    // Read back through the cache the way the dashboard does.
    let snapshot = state.dashboard().refresh().await?;
    tracing::info!(
        nutrition_score = snapshot.nutrition_score,
        completed = snapshot.meal_completion.completed_meals,
        total = snapshot.meal_completion.total_meals,
        next_checkup = ?snapshot.next_checkup,
        "dashboard refreshed"
    );

    Ok(())
}
