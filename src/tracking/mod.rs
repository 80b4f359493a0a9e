pub mod dto;
pub mod tracker;

pub use dto::{CompleteMealRequest, MealTrackingSummary, MealType};
pub use tracker::MealCompletionTracker;
