use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::WorkflowError;
use crate::health::dto::{ActivityLevel, BloodPressure, DietPreference, HealthEntry};
use crate::health::validation::{validate_all, validate_step};

/// The mutually-exclusive chronic-condition checkbox. Selecting it clears
/// every other selection; while it is selected, other selections are blocked.
pub const NONE_OF_THE_ABOVE: &str = "None of the above";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormStep {
    Demographics,
    Medical,
    Labs,
    Dietary,
    Lifestyle,
    Special,
}

impl FormStep {
    pub const ALL: [FormStep; 6] = [
        FormStep::Demographics,
        FormStep::Medical,
        FormStep::Labs,
        FormStep::Dietary,
        FormStep::Lifestyle,
        FormStep::Special,
    ];

    pub const TOTAL: usize = Self::ALL.len();

    /// 1-based position, matching the step indicator in the UI.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index >= 1).then(|| Self::ALL.get(index - 1).copied()).flatten()
    }

    pub fn title(self) -> &'static str {
        match self {
            FormStep::Demographics => "Demographics",
            FormStep::Medical => "Medical",
            FormStep::Labs => "Labs",
            FormStep::Dietary => "Dietary",
            FormStep::Lifestyle => "Lifestyle",
            FormStep::Special => "Special",
        }
    }
}

/// The health-entry form and the profile-setup wizard share the same steps;
/// only the profile-setup variant gates step 6 on a chronic-disease choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormVariant {
    HealthEntry,
    ProfileSetup,
}

/// All-optional working copy of a health entry while the form is open.
/// Kept explicit (no dynamic field bag) so absent values stay visible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthEntryDraft {
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub trimester: Option<u8>,
    pub hemoglobin: Option<f64>,
    pub blood_sugar: Option<f64>,
    pub blood_pressure: Option<BloodPressure>,
    pub vitamin_d: Option<f64>,
    pub vitamin_b12: Option<f64>,
    pub vitamin_a: Option<f64>,
    pub vitamin_c: Option<f64>,
    pub calcium: Option<f64>,
    pub iron_levels: Option<f64>,
    pub diet_preference: Option<DietPreference>,
    pub food_allergies: Vec<String>,
    pub religious_cultural_restrictions: Vec<String>,
    pub activity_level: Option<ActivityLevel>,
    pub sleep_hours: Option<f64>,
    pub water_intake: Option<f64>,
    pub is_multiple: bool,
    pub multiple_type: Option<String>,
    pub is_high_risk: bool,
    pub current_supplements: Vec<String>,
    pub notes: Option<String>,
    /// Profile-setup variant only.
    pub chronic_conditions: Vec<String>,
}

/// One typed field edit. The tagged union replaces the web client's
/// stringly-keyed `setField(name, value)`.
#[derive(Debug, Clone)]
pub enum FieldUpdate {
    Age(u32),
    Height(f64),
    Weight(f64),
    /// Manual BMI entry. Overwritten by the next height/weight change.
    Bmi(f64),
    Trimester(u8),
    Hemoglobin(f64),
    BloodSugar(f64),
    BloodPressure(BloodPressure),
    VitaminD(f64),
    VitaminB12(f64),
    VitaminA(f64),
    VitaminC(f64),
    Calcium(f64),
    IronLevels(f64),
    DietPreference(DietPreference),
    FoodAllergies(Vec<String>),
    ReligiousCulturalRestrictions(Vec<String>),
    ActivityLevel(ActivityLevel),
    SleepHours(f64),
    WaterIntake(f64),
    IsMultiple(bool),
    MultipleType(Option<String>),
    IsHighRisk(bool),
    CurrentSupplements(Vec<String>),
    Notes(String),
    ToggleChronicCondition(String),
}

/// `weight / (height/100)^2`, rounded to one decimal. `None` unless both
/// inputs are positive.
pub fn compute_bmi(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let metres = height_cm / 100.0;
    Some(round1(weight_kg / (metres * metres)))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Six-step entry form. `next`/`previous` only move within the step range;
/// the chronic-condition gate on the profile-setup variant is the single
/// validation gate before submit.
#[derive(Debug, Clone)]
pub struct HealthEntryForm {
    variant: FormVariant,
    step: FormStep,
    draft: HealthEntryDraft,
    ai_opt_in: bool,
}

impl HealthEntryForm {
    pub fn new(variant: FormVariant) -> Self {
        Self::from_draft(variant, HealthEntryDraft::default())
    }

    /// Resume from a pre-filled draft (CLI input, persisted partial form).
    /// When both height and weight are present, BMI is recomputed so a
    /// stale value in the draft cannot survive.
    pub fn from_draft(variant: FormVariant, draft: HealthEntryDraft) -> Self {
        let mut form = Self {
            variant,
            step: FormStep::Demographics,
            draft,
            ai_opt_in: false,
        };
        form.recompute_bmi();
        form
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn draft(&self) -> &HealthEntryDraft {
        &self.draft
    }

    /// The "Enable AI Diet Plan Generation" checkbox. A UI safety gate for
    /// the generate action, not a data constraint.
    pub fn set_ai_opt_in(&mut self, enabled: bool) {
        self.ai_opt_in = enabled;
    }

    pub fn can_generate(&self) -> bool {
        self.ai_opt_in
    }

    pub fn next(&mut self) {
        if let Some(step) = FormStep::from_index(self.step.index() + 1) {
            self.step = step;
        }
    }

    pub fn previous(&mut self) {
        if let Some(step) = FormStep::from_index(self.step.index().wrapping_sub(1)) {
            self.step = step;
        }
    }

    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Age(v) => self.draft.age = Some(v),
            FieldUpdate::Height(v) => {
                self.draft.height = Some(v);
                self.recompute_bmi();
            }
            FieldUpdate::Weight(v) => {
                self.draft.weight = Some(v);
                self.recompute_bmi();
            }
            FieldUpdate::Bmi(v) => self.draft.bmi = Some(round1(v)),
            FieldUpdate::Trimester(v) => self.draft.trimester = Some(v),
            FieldUpdate::Hemoglobin(v) => self.draft.hemoglobin = Some(v),
            FieldUpdate::BloodSugar(v) => self.draft.blood_sugar = Some(v),
            FieldUpdate::BloodPressure(v) => self.draft.blood_pressure = Some(v),
            FieldUpdate::VitaminD(v) => self.draft.vitamin_d = Some(v),
            FieldUpdate::VitaminB12(v) => self.draft.vitamin_b12 = Some(v),
            FieldUpdate::VitaminA(v) => self.draft.vitamin_a = Some(v),
            FieldUpdate::VitaminC(v) => self.draft.vitamin_c = Some(v),
            FieldUpdate::Calcium(v) => self.draft.calcium = Some(v),
            FieldUpdate::IronLevels(v) => self.draft.iron_levels = Some(v),
            FieldUpdate::DietPreference(v) => self.draft.diet_preference = Some(v),
            FieldUpdate::FoodAllergies(v) => self.draft.food_allergies = v,
            FieldUpdate::ReligiousCulturalRestrictions(v) => {
                self.draft.religious_cultural_restrictions = v
            }
            FieldUpdate::ActivityLevel(v) => self.draft.activity_level = Some(v),
            FieldUpdate::SleepHours(v) => self.draft.sleep_hours = Some(v),
            FieldUpdate::WaterIntake(v) => self.draft.water_intake = Some(v),
            FieldUpdate::IsMultiple(v) => {
                self.draft.is_multiple = v;
                if !v {
                    self.draft.multiple_type = None;
                }
            }
            FieldUpdate::MultipleType(v) => self.draft.multiple_type = v,
            FieldUpdate::IsHighRisk(v) => self.draft.is_high_risk = v,
            FieldUpdate::CurrentSupplements(v) => self.draft.current_supplements = v,
            FieldUpdate::Notes(v) => self.draft.notes = Some(v),
            FieldUpdate::ToggleChronicCondition(name) => self.toggle_chronic(name),
        }
    }

    /// The recompute runs after every height/weight change, so a manual BMI
    /// entry never survives the next change to either field.
    fn recompute_bmi(&mut self) {
        if let (Some(h), Some(w)) = (self.draft.height, self.draft.weight) {
            self.draft.bmi = compute_bmi(h, w);
        }
    }

    fn toggle_chronic(&mut self, name: String) {
        let conditions = &mut self.draft.chronic_conditions;
        if let Some(pos) = conditions.iter().position(|c| *c == name) {
            conditions.remove(pos);
        } else if name == NONE_OF_THE_ABOVE {
            conditions.clear();
            conditions.push(name);
        } else if conditions.iter().any(|c| c == NONE_OF_THE_ABOVE) {
            // Blocked while "None of the above" is selected (checkbox is
            // disabled in the UI).
            debug!(condition = %name, "chronic selection blocked by exclusive option");
        } else {
            conditions.push(name);
        }
    }

    /// Pre-submit gate: full-form validation plus, when generation is
    /// requested, the AI opt-in checkbox.
    pub fn validate_for_submit(&self, generate: bool) -> Result<(), WorkflowError> {
        validate_all(&self.draft, self.variant)?;
        if generate && !self.ai_opt_in {
            return Err(WorkflowError::validation(
                "Enable AI diet plan generation before generating a plan",
            ));
        }
        Ok(())
    }

    pub fn validate_current_step(&self) -> Result<(), WorkflowError> {
        validate_step(&self.draft, self.step, self.variant)
    }

    /// Freeze the draft into the wire entry. Ids are assigned server-side.
    pub fn finalize(&self, user_id: Option<String>) -> HealthEntry {
        let d = &self.draft;
        HealthEntry {
            id: None,
            user_id,
            entry_date: OffsetDateTime::now_utc(),
            age: d.age,
            height: d.height,
            weight: d.weight,
            bmi: d.bmi,
            trimester: d.trimester,
            hemoglobin: d.hemoglobin,
            blood_sugar: d.blood_sugar,
            blood_pressure: d.blood_pressure,
            vitamin_d: d.vitamin_d,
            vitamin_b12: d.vitamin_b12,
            vitamin_a: d.vitamin_a,
            vitamin_c: d.vitamin_c,
            calcium: d.calcium,
            iron_levels: d.iron_levels,
            diet_preference: d.diet_preference,
            food_allergies: d.food_allergies.clone(),
            religious_cultural_restrictions: d.religious_cultural_restrictions.clone(),
            activity_level: d.activity_level,
            sleep_hours: d.sleep_hours,
            water_intake: d.water_intake,
            is_multiple: d.is_multiple,
            multiple_type: d.multiple_type.clone(),
            is_high_risk: d.is_high_risk,
            current_supplements: d.current_supplements.clone(),
            notes: d.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_recomputes_whenever_height_or_weight_changes() {
        let mut form = HealthEntryForm::new(FormVariant::HealthEntry);
        form.apply(FieldUpdate::Height(165.0));
        assert_eq!(form.draft().bmi, None, "one input is not enough");

        form.apply(FieldUpdate::Weight(65.0));
        assert_eq!(form.draft().bmi, Some(23.9));

        form.apply(FieldUpdate::Weight(72.0));
        assert_eq!(form.draft().bmi, Some(26.4));

        form.apply(FieldUpdate::Height(170.0));
        assert_eq!(form.draft().bmi, Some(24.9));
    }

    #[test]
    fn manual_bmi_is_overwritten_by_the_next_change() {
        let mut form = HealthEntryForm::new(FormVariant::HealthEntry);
        form.apply(FieldUpdate::Height(165.0));
        form.apply(FieldUpdate::Weight(65.0));

        form.apply(FieldUpdate::Bmi(30.0));
        assert_eq!(form.draft().bmi, Some(30.0));

        form.apply(FieldUpdate::Weight(65.0));
        assert_eq!(form.draft().bmi, Some(23.9), "recompute wins");
    }

    #[test]
    fn steps_clamp_at_both_ends() {
        let mut form = HealthEntryForm::new(FormVariant::HealthEntry);
        form.previous();
        assert_eq!(form.step(), FormStep::Demographics);

        for _ in 0..10 {
            form.next();
        }
        assert_eq!(form.step(), FormStep::Special);
        assert_eq!(form.step().index(), FormStep::TOTAL);

        form.previous();
        assert_eq!(form.step(), FormStep::Lifestyle);
    }

    #[test]
    fn none_of_the_above_clears_other_selections() {
        let mut form = HealthEntryForm::new(FormVariant::ProfileSetup);
        form.apply(FieldUpdate::ToggleChronicCondition("Diabetes".into()));
        form.apply(FieldUpdate::ToggleChronicCondition("Hypertension".into()));
        assert_eq!(form.draft().chronic_conditions.len(), 2);

        form.apply(FieldUpdate::ToggleChronicCondition(NONE_OF_THE_ABOVE.into()));
        assert_eq!(
            form.draft().chronic_conditions,
            vec![NONE_OF_THE_ABOVE.to_string()]
        );
    }

    #[test]
    fn other_selections_are_blocked_while_none_is_selected() {
        let mut form = HealthEntryForm::new(FormVariant::ProfileSetup);
        form.apply(FieldUpdate::ToggleChronicCondition(NONE_OF_THE_ABOVE.into()));
        form.apply(FieldUpdate::ToggleChronicCondition("Diabetes".into()));
        assert_eq!(
            form.draft().chronic_conditions,
            vec![NONE_OF_THE_ABOVE.to_string()]
        );

        // Deselecting the exclusive option re-enables the rest.
        form.apply(FieldUpdate::ToggleChronicCondition(NONE_OF_THE_ABOVE.into()));
        form.apply(FieldUpdate::ToggleChronicCondition("Diabetes".into()));
        assert_eq!(form.draft().chronic_conditions, vec!["Diabetes".to_string()]);
    }

    #[test]
    fn generate_requires_the_opt_in_checkbox() {
        let mut form = HealthEntryForm::new(FormVariant::HealthEntry);
        let err = form.validate_for_submit(true).unwrap_err();
        assert!(err.to_string().contains("Enable AI"));

        form.validate_for_submit(false).expect("save-only path is open");

        form.set_ai_opt_in(true);
        form.validate_for_submit(true).expect("opt-in clears the gate");
    }

    #[test]
    fn finalize_carries_the_derived_bmi() {
        let mut form = HealthEntryForm::new(FormVariant::HealthEntry);
        form.apply(FieldUpdate::Height(165.0));
        form.apply(FieldUpdate::Weight(65.0));
        form.apply(FieldUpdate::Trimester(2));

        let entry = form.finalize(Some("u1".into()));
        assert_eq!(entry.bmi, Some(23.9));
        assert_eq!(entry.user_id.as_deref(), Some("u1"));
        assert!(entry.id.is_none(), "ids are server-assigned");
    }
}
