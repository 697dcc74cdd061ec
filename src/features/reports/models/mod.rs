mod report;
mod status_history;

pub use report::{DamageCategory, Priority, Report, ReportStatus};
pub use status_history::StatusHistoryWithActor;
