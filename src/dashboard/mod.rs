pub mod aggregator;
pub mod checkup;
pub mod dto;

pub use aggregator::DashboardAggregator;
pub use checkup::next_checkup;
pub use dto::{CheckupStatus, DashboardSnapshot, DashboardStats};
