use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::auth::models::CurrentUser;
use crate::features::reports::dtos::{CreateReportDto, StatusUpdateDto};
use crate::features::reports::models::{Report, ReportStatus, StatusHistoryWithActor};
use crate::features::reports::services::priority;
use crate::modules::mailer::Notifier;

const REPORT_COLUMNS: &str = "id, title, description, category, facility_type, location, \
     priority, photo_url, status, user_id, reviewer_id, created_at, updated_at";

/// Service for the damage report lifecycle
pub struct ReportService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl ReportService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Submit a new report on behalf of the authenticated student.
    ///
    /// The report and its initial "submitted" history entry are written in
    /// one transaction, so every report carries at least one history row.
    pub async fn create(&self, dto: CreateReportDto, author: &CurrentUser) -> Result<Report> {
        for (field, value) in [
            ("title", &dto.title),
            ("description", &dto.description),
            ("facility_type", &dto.facility_type),
            ("location", &dto.location),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "Field '{}' must not be blank",
                    field
                )));
            }
        }

        let priority = priority::classify(&dto.facility_type, dto.category);
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let report = sqlx::query_as::<_, Report>(&format!(
            "INSERT INTO reports \
             (title, description, category, facility_type, location, priority, photo_url, \
              status, user_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(dto.title.trim())
        .bind(dto.description.trim())
        .bind(dto.category)
        .bind(dto.facility_type.trim())
        .bind(dto.location.trim())
        .bind(priority)
        .bind(&dto.photo_url)
        .bind(ReportStatus::Submitted)
        .bind(author.id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(
            "INSERT INTO status_history (report_id, status, note, user_id, created_at) \
             VALUES (?, ?, NULL, ?, ?)",
        )
        .bind(report.id)
        .bind(ReportStatus::Submitted)
        .bind(author.id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert initial history entry: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Report created: id={}, priority={}, author={}",
            report.id,
            report.priority,
            author.id
        );

        Ok(report)
    }

    /// Apply a staff status update.
    ///
    /// Terminal reports are locked. Requests that would move a report back to
    /// "submitted" are rejected outright.
    pub async fn update_status(
        &self,
        report_id: i64,
        dto: StatusUpdateDto,
        reviewer: &CurrentUser,
    ) -> Result<Report> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let current = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?"
        ))
        .bind(report_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch report for update: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report '{}' not found", report_id)))?;

        // Existence is settled first, so a missing id is always 404 no
        // matter what the payload asks for.
        if dto.status == ReportStatus::Submitted {
            return Err(AppError::Validation(
                "A report cannot be moved back to 'submitted'".to_string(),
            ));
        }

        // dto.status != submitted was rejected above, so the only illegal
        // transitions left are those out of a terminal state.
        if !current.status.can_transition_to(dto.status) {
            return Err(AppError::Conflict(format!(
                "Report '{}' is already {} and cannot be updated",
                report_id, current.status
            )));
        }

        let now = Utc::now();

        let updated = sqlx::query_as::<_, Report>(&format!(
            "UPDATE reports SET status = ?, reviewer_id = ?, updated_at = ? WHERE id = ? \
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(dto.status)
        .bind(reviewer.id)
        .bind(now)
        .bind(report_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(
            "INSERT INTO status_history (report_id, status, note, user_id, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(report_id)
        .bind(dto.status)
        .bind(&dto.note)
        .bind(reviewer.id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert history entry: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit status update: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Report {} moved to {} by reviewer {}",
            report_id,
            updated.status,
            reviewer.id
        );

        self.spawn_status_notification(updated.clone(), dto.note);

        Ok(updated)
    }

    /// Fetch a single report by id.
    pub async fn get(&self, report_id: i64) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?"
        ))
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report '{}' not found", report_id)))
    }

    /// List a user's own reports, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports for user: {:?}", e);
            AppError::Database(e)
        })
    }

    /// List every report, newest first. Staff only.
    pub async fn list_all(&self) -> Result<Vec<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list all reports: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Fetch a report's status history, newest first, with each acting
    /// user's display name resolved at read time.
    pub async fn history(&self, report_id: i64) -> Result<Vec<StatusHistoryWithActor>> {
        sqlx::query_as::<_, StatusHistoryWithActor>(
            "SELECT h.id, h.status, h.note, u.display_name, h.created_at \
             FROM status_history h \
             JOIN users u ON u.id = h.user_id \
             WHERE h.report_id = ? \
             ORDER BY h.created_at DESC, h.id DESC",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch report history: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Fire-and-forget email to the report author. Failures are logged only.
    fn spawn_status_notification(&self, report: Report, note: Option<String>) {
        let pool = self.pool.clone();
        let notifier = self.notifier.clone();

        tokio::spawn(async move {
            let email: Option<(String,)> =
                match sqlx::query_as("SELECT email FROM users WHERE id = ?")
                    .bind(report.user_id)
                    .fetch_optional(&pool)
                    .await
                {
                    Ok(row) => row,
                    Err(e) => {
                        tracing::warn!(
                            "Skipping notification for report {}: author lookup failed: {:?}",
                            report.id,
                            e
                        );
                        return;
                    }
                };

            let Some((email,)) = email else {
                tracing::warn!(
                    "Skipping notification for report {}: author {} not found",
                    report.id,
                    report.user_id
                );
                return;
            };

            if let Err(e) = notifier
                .notify_status_change(
                    &email,
                    report.id,
                    &report.title,
                    &report.status.to_string(),
                    note.as_deref(),
                )
                .await
            {
                tracing::warn!(
                    "Failed to send status notification for report {}: {:?}",
                    report.id,
                    e
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::models::UserRole;
    use crate::features::reports::dtos::{CreateReportDto, StatusUpdateDto};
    use crate::features::reports::models::{DamageCategory, Priority};
    use crate::shared::test_helpers::{seed_user, test_pool};

    struct NullNotifier;

    #[async_trait::async_trait]
    impl Notifier for NullNotifier {
        async fn notify_status_change(
            &self,
            _recipient: &str,
            _report_id: i64,
            _report_title: &str,
            _new_status: &str,
            _note: Option<&str>,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    async fn service() -> (ReportService, SqlitePool) {
        let pool = test_pool().await;
        (
            ReportService::new(pool.clone(), Arc::new(NullNotifier)),
            pool,
        )
    }

    fn sample_dto(facility: &str, category: DamageCategory) -> CreateReportDto {
        CreateReportDto {
            title: "Rusak".to_string(),
            description: "Tidak berfungsi sejak kemarin".to_string(),
            category,
            facility_type: facility.to_string(),
            location: "Gedung A ruang 101".to_string(),
            photo_url: None,
        }
    }

    async fn raw_history(pool: &SqlitePool, report_id: i64) -> Vec<(ReportStatus, Option<String>, i64)> {
        sqlx::query_as(
            "SELECT status, note, user_id \
             FROM status_history WHERE report_id = ? ORDER BY id",
        )
        .bind(report_id)
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_sets_submitted_and_classified_priority() {
        let (service, pool) = service().await;
        let author = seed_user(&pool, "budi", UserRole::Student).await;

        let report = service
            .create(sample_dto("Proyektor", DamageCategory::Severe), &author.into())
            .await
            .unwrap();

        assert_eq!(report.status, ReportStatus::Submitted);
        assert_eq!(report.priority, Priority::High);
        assert!(report.reviewer_id.is_none());
    }

    #[tokio::test]
    async fn create_writes_initial_history_entry() {
        let (service, pool) = service().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();

        let report = service
            .create(sample_dto("Kursi", DamageCategory::Minor), &author)
            .await
            .unwrap();

        let history = raw_history(&pool, report.id).await;
        assert_eq!(history.len(), 1);
        let (status, note, user_id) = &history[0];
        assert_eq!(*status, ReportStatus::Submitted);
        assert_eq!(*user_id, author.id);
        assert!(note.is_none());
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let (service, pool) = service().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();

        let mut dto = sample_dto("Kursi", DamageCategory::Minor);
        dto.title = "   ".to_string();

        let err = service.create(dto, &author).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_status_appends_history_and_sets_reviewer() {
        let (service, pool) = service().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();
        let staff: CurrentUser = seed_user(&pool, "sari", UserRole::Staff).await.into();

        let report = service
            .create(sample_dto("Kursi", DamageCategory::Minor), &author)
            .await
            .unwrap();

        let updated = service
            .update_status(
                report.id,
                StatusUpdateDto {
                    status: ReportStatus::InProgress,
                    note: Some("Teknisi dijadwalkan".to_string()),
                },
                &staff,
            )
            .await
            .unwrap();

        assert_eq!(updated.status, ReportStatus::InProgress);
        assert_eq!(updated.reviewer_id, Some(staff.id));
        // The submitting user never changes.
        assert_eq!(updated.user_id, author.id);

        let history = raw_history(&pool, report.id).await;
        assert_eq!(history.len(), 2);
        let (status, note, user_id) = &history[1];
        assert_eq!(*status, ReportStatus::InProgress);
        assert_eq!(*user_id, staff.id);
        assert_eq!(note.as_deref(), Some("Teknisi dijadwalkan"));
    }

    #[tokio::test]
    async fn update_status_rejects_return_to_submitted() {
        let (service, pool) = service().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();
        let staff: CurrentUser = seed_user(&pool, "sari", UserRole::Staff).await.into();

        let report = service
            .create(sample_dto("Kursi", DamageCategory::Minor), &author)
            .await
            .unwrap();

        let err = service
            .update_status(
                report.id,
                StatusUpdateDto {
                    status: ReportStatus::Submitted,
                    note: None,
                },
                &staff,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn terminal_report_is_locked() {
        let (service, pool) = service().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();
        let staff: CurrentUser = seed_user(&pool, "sari", UserRole::Staff).await.into();

        let report = service
            .create(sample_dto("Kursi", DamageCategory::Minor), &author)
            .await
            .unwrap();

        service
            .update_status(
                report.id,
                StatusUpdateDto {
                    status: ReportStatus::Resolved,
                    note: None,
                },
                &staff,
            )
            .await
            .unwrap();

        let err = service
            .update_status(
                report.id,
                StatusUpdateDto {
                    status: ReportStatus::InProgress,
                    note: None,
                },
                &staff,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));

        // The failed update leaves no trace in the history.
        assert_eq!(raw_history(&pool, report.id).await.len(), 2);
    }

    #[tokio::test]
    async fn update_status_of_missing_report_is_not_found() {
        let (service, pool) = service().await;
        let staff: CurrentUser = seed_user(&pool, "sari", UserRole::Staff).await.into();

        let err = service
            .update_status(
                9999,
                StatusUpdateDto {
                    status: ReportStatus::InProgress,
                    note: None,
                },
                &staff,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));

        // A missing id stays 404 even when the payload is itself illegal.
        let err = service
            .update_status(
                9999,
                StatusUpdateDto {
                    status: ReportStatus::Submitted,
                    note: None,
                },
                &staff,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_for_user_returns_only_own_reports() {
        let (service, pool) = service().await;
        let budi: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();
        let ani: CurrentUser = seed_user(&pool, "ani", UserRole::Student).await.into();

        service
            .create(sample_dto("Kursi", DamageCategory::Minor), &budi)
            .await
            .unwrap();
        service
            .create(sample_dto("Meja", DamageCategory::Minor), &ani)
            .await
            .unwrap();

        let reports = service.list_for_user(budi.id).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].user_id, budi.id);

        assert_eq!(service.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn history_is_newest_first_with_display_names() {
        let (service, pool) = service().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();
        let staff: CurrentUser = seed_user(&pool, "sari", UserRole::Staff).await.into();

        let report = service
            .create(sample_dto("Kursi", DamageCategory::Minor), &author)
            .await
            .unwrap();
        service
            .update_status(
                report.id,
                StatusUpdateDto {
                    status: ReportStatus::InProgress,
                    note: None,
                },
                &staff,
            )
            .await
            .unwrap();

        let history = service.history(report.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, ReportStatus::InProgress);
        assert_eq!(history[0].display_name, staff.display_name);
        assert_eq!(history[1].status, ReportStatus::Submitted);
        assert_eq!(history[1].display_name, author.display_name);
    }
}
