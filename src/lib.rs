pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod plan;
pub mod state;
pub mod storage;
pub mod tracking;
pub mod workflow;

pub use config::AppConfig;
pub use error::WorkflowError;
pub use state::AppState;
pub use workflow::{DietPlanWorkflow, SubmitOutcome, WorkflowStage};
