use sqlx::SqlitePool;

use crate::features::reports::models::{DamageCategory, ReportStatus};
use crate::features::stats::dtos::{
    CategoryCountDto, FacilityCountDto, StatisticsDto, StatusCountDto,
};
use crate::shared::constants::TOP_FACILITIES_LIMIT;

/// Service for aggregate report statistics
pub struct StatsService {
    pool: SqlitePool,
}

impl StatsService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Build the statistics summary.
    ///
    /// Never fails: if any aggregation query errors, the failure is logged
    /// and an all-zero summary is returned instead.
    pub async fn summary(&self) -> StatisticsDto {
        match self.collect().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Statistics aggregation failed, returning empty summary: {:?}", e);
                StatisticsDto::empty()
            }
        }
    }

    async fn collect(&self) -> Result<StatisticsDto, sqlx::Error> {
        let total_laporan: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;

        // Calendar month in UTC, matching the stored timestamps.
        let laporan_bulan_ini: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports \
             WHERE strftime('%Y-%m', created_at) = strftime('%Y-%m', 'now')",
        )
        .fetch_one(&self.pool)
        .await?;

        let rata_waktu_penanganan_hari: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(julianday(updated_at) - julianday(created_at)) \
             FROM reports WHERE status = 'resolved'",
        )
        .fetch_one(&self.pool)
        .await?;

        let status_rows: Vec<(ReportStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM reports GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        // Zero-fill so all four statuses are always present.
        let per_status = ReportStatus::ALL
            .into_iter()
            .map(|status| StatusCountDto {
                status,
                count: status_rows
                    .iter()
                    .find(|(s, _)| *s == status)
                    .map(|(_, count)| *count)
                    .unwrap_or(0),
            })
            .collect();

        let per_kategori = sqlx::query_as::<_, (DamageCategory, i64)>(
            "SELECT category, COUNT(*) FROM reports GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(category, count)| CategoryCountDto { category, count })
        .collect();

        let per_fasilitas = sqlx::query_as::<_, (String, i64)>(
            "SELECT facility_type, COUNT(*) AS count FROM reports \
             GROUP BY facility_type \
             ORDER BY count DESC, facility_type ASC \
             LIMIT ?",
        )
        .bind(TOP_FACILITIES_LIMIT)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(facility_type, count)| FacilityCountDto {
            facility_type,
            count,
        })
        .collect();

        Ok(StatisticsDto {
            total_laporan,
            laporan_bulan_ini,
            rata_waktu_penanganan_hari,
            per_status,
            per_kategori,
            per_fasilitas,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::features::auth::models::{CurrentUser, UserRole};
    use crate::features::reports::dtos::{CreateReportDto, StatusUpdateDto};
    use crate::features::reports::services::ReportService;
    use crate::modules::mailer::Notifier;
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

    fn dto(facility: &str) -> CreateReportDto {
        CreateReportDto {
            title: "Rusak".to_string(),
            description: "Perlu perbaikan".to_string(),
            category: crate::features::reports::models::DamageCategory::Minor,
            facility_type: facility.to_string(),
            location: "Gedung B".to_string(),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn empty_database_yields_zero_summary_with_full_status_shape() {
        let pool = test_pool().await;
        let stats = StatsService::new(pool).summary().await;

        assert_eq!(stats.total_laporan, 0);
        assert_eq!(stats.laporan_bulan_ini, 0);
        assert!(stats.rata_waktu_penanganan_hari.is_none());
        assert_eq!(stats.per_status.len(), 4);
        assert!(stats.per_status.iter().all(|s| s.count == 0));
        assert!(stats.per_kategori.is_empty());
        assert!(stats.per_fasilitas.is_empty());
    }

    #[tokio::test]
    async fn per_status_counts_sum_to_total() {
        let pool = test_pool().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();
        let staff: CurrentUser = seed_user(&pool, "sari", UserRole::Staff).await.into();

        let reports = ReportService::new(pool.clone(), Arc::new(NullNotifier));
        let a = reports.create(dto("Kursi"), &author).await.unwrap();
        reports.create(dto("Meja"), &author).await.unwrap();
        reports.create(dto("Kursi"), &author).await.unwrap();

        reports
            .update_status(
                a.id,
                StatusUpdateDto {
                    status: crate::features::reports::models::ReportStatus::Resolved,
                    note: None,
                },
                &staff,
            )
            .await
            .unwrap();

        let stats = StatsService::new(pool).summary().await;

        assert_eq!(stats.total_laporan, 3);
        assert_eq!(stats.laporan_bulan_ini, 3);
        assert_eq!(
            stats.per_status.iter().map(|s| s.count).sum::<i64>(),
            stats.total_laporan
        );
        assert_eq!(stats.per_status.len(), 4);
        assert!(stats.rata_waktu_penanganan_hari.is_some());
    }

    #[tokio::test]
    async fn facility_ranking_is_count_then_name() {
        let pool = test_pool().await;
        let author: CurrentUser = seed_user(&pool, "budi", UserRole::Student).await.into();

        let reports = ReportService::new(pool.clone(), Arc::new(NullNotifier));
        reports.create(dto("Kursi"), &author).await.unwrap();
        reports.create(dto("Kursi"), &author).await.unwrap();
        reports.create(dto("Meja"), &author).await.unwrap();
        reports.create(dto("AC"), &author).await.unwrap();

        let stats = StatsService::new(pool).summary().await;

        assert_eq!(stats.per_fasilitas[0].facility_type, "Kursi");
        assert_eq!(stats.per_fasilitas[0].count, 2);
        // Ties are broken alphabetically.
        assert_eq!(stats.per_fasilitas[1].facility_type, "AC");
        assert_eq!(stats.per_fasilitas[2].facility_type, "Meja");
    }
}
