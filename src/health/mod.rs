pub mod dto;
pub mod form;
pub mod validation;

pub use dto::{ActivityLevel, BloodPressure, DietPreference, HealthEntry};
pub use form::{FieldUpdate, FormStep, FormVariant, HealthEntryDraft, HealthEntryForm};
