use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Damage severity as judged by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DamageCategory {
    Minor,
    Severe,
}

impl std::fmt::Display for DamageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DamageCategory::Minor => write!(f, "minor"),
            DamageCategory::Severe => write!(f, "severe"),
        }
    }
}

/// Handling priority, derived from the facility type and damage category.
/// Never supplied by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Bump one level up, saturating at High.
    pub fn escalate(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::High,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Report lifecycle status.
///
/// Every report starts at Submitted. Staff may move it to any other status,
/// but Resolved and Rejected are terminal and no report ever returns to
/// Submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    InProgress,
    Resolved,
    Rejected,
}

impl ReportStatus {
    /// All statuses, in lifecycle order. Used to zero-fill aggregations.
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Submitted,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
        ReportStatus::Rejected,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Rejected)
    }

    /// Whether a staff update may move a report from this status to `next`.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next != ReportStatus::Submitted
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Submitted => write!(f, "submitted"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Database model for a damage report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: DamageCategory,
    pub facility_type: String,
    pub location: String,
    pub priority: Priority,
    pub photo_url: Option<String>,
    pub status: ReportStatus,
    pub user_id: i64,
    pub reviewer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_accept_no_transition() {
        for next in ReportStatus::ALL {
            assert!(!ReportStatus::Resolved.can_transition_to(next));
            assert!(!ReportStatus::Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn no_status_returns_to_submitted() {
        for from in ReportStatus::ALL {
            assert!(!from.can_transition_to(ReportStatus::Submitted));
        }
    }

    #[test]
    fn open_statuses_reach_all_non_submitted_targets() {
        for from in [ReportStatus::Submitted, ReportStatus::InProgress] {
            assert!(from.can_transition_to(ReportStatus::InProgress));
            assert!(from.can_transition_to(ReportStatus::Resolved));
            assert!(from.can_transition_to(ReportStatus::Rejected));
        }
    }

    #[test]
    fn priority_escalation_saturates() {
        assert_eq!(Priority::Low.escalate(), Priority::Medium);
        assert_eq!(Priority::Medium.escalate(), Priority::High);
        assert_eq!(Priority::High.escalate(), Priority::High);
    }
}
