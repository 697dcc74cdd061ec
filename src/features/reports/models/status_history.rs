use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::reports::models::ReportStatus;

/// Status history row joined with the acting user's display name.
///
/// The history table stores user ids only; names are resolved at read time
/// so later display-name changes show up in old entries.
#[derive(Debug, Clone, FromRow)]
pub struct StatusHistoryWithActor {
    pub id: i64,
    pub status: ReportStatus,
    pub note: Option<String>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}
