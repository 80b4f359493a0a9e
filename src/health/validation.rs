use crate::error::WorkflowError;
use crate::health::form::{FormStep, FormVariant, HealthEntryDraft};

/// Per-step validation. Steps are deliberately permissive (fields may be
/// left empty), but a value that is present must be plausible. The only
/// hard gate is the chronic-condition selection on the Special step of the
/// profile-setup variant.
pub fn validate_step(
    draft: &HealthEntryDraft,
    step: FormStep,
    variant: FormVariant,
) -> Result<(), WorkflowError> {
    match step {
        FormStep::Demographics => {
            check_range(draft.age.map(f64::from), 10.0, 60.0, "Age")?;
            check_positive(draft.height, "Height")?;
            check_positive(draft.weight, "Weight")?;
        }
        FormStep::Medical => {
            if let Some(t) = draft.trimester {
                if !(1..=3).contains(&t) {
                    return Err(WorkflowError::validation("Trimester must be 1, 2 or 3"));
                }
            }
            check_positive(draft.hemoglobin, "Hemoglobin")?;
            check_positive(draft.blood_sugar, "Blood sugar")?;
        }
        FormStep::Labs => {
            check_positive(draft.vitamin_d, "Vitamin D")?;
            check_positive(draft.vitamin_b12, "Vitamin B12")?;
            check_positive(draft.vitamin_a, "Vitamin A")?;
            check_positive(draft.vitamin_c, "Vitamin C")?;
            check_positive(draft.calcium, "Calcium")?;
            check_positive(draft.iron_levels, "Iron")?;
        }
        FormStep::Dietary => {}
        FormStep::Lifestyle => {
            check_range(draft.sleep_hours, 0.0, 24.0, "Sleep hours")?;
            check_positive(draft.water_intake, "Water intake")?;
        }
        FormStep::Special => {
            if variant == FormVariant::ProfileSetup && draft.chronic_conditions.is_empty() {
                return Err(WorkflowError::validation(
                    "Select at least one chronic condition (or \"None of the above\")",
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_all(draft: &HealthEntryDraft, variant: FormVariant) -> Result<(), WorkflowError> {
    for step in FormStep::ALL {
        validate_step(draft, step, variant)?;
    }
    Ok(())
}

fn check_positive(value: Option<f64>, label: &str) -> Result<(), WorkflowError> {
    match value {
        Some(v) if v <= 0.0 => Err(WorkflowError::Validation(format!(
            "{label} must be greater than zero"
        ))),
        _ => Ok(()),
    }
}

fn check_range(value: Option<f64>, min: f64, max: f64, label: &str) -> Result<(), WorkflowError> {
    match value {
        Some(v) if v < min || v > max => Err(WorkflowError::Validation(format!(
            "{label} must be between {min} and {max}"
        ))),
        _ => Ok(()),
    }
}
