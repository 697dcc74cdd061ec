use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::{DamageCategory, ReportStatus};

/// Report count for one lifecycle status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusCountDto {
    pub status: ReportStatus,
    pub count: i64,
}

/// Report count for one damage category
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryCountDto {
    pub category: DamageCategory,
    pub count: i64,
}

/// Report count for one facility type
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FacilityCountDto {
    pub facility_type: String,
    pub count: i64,
}

/// Aggregate statistics over all reports
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatisticsDto {
    pub total_laporan: i64,
    pub laporan_bulan_ini: i64,
    /// Average days from submission to resolution. None until at least one
    /// report has been resolved.
    pub rata_waktu_penanganan_hari: Option<f64>,
    pub per_status: Vec<StatusCountDto>,
    pub per_kategori: Vec<CategoryCountDto>,
    pub per_fasilitas: Vec<FacilityCountDto>,
}

impl StatisticsDto {
    /// All-zero statistics. Every status is still present so clients can
    /// rely on the shape.
    pub fn empty() -> Self {
        Self {
            total_laporan: 0,
            laporan_bulan_ini: 0,
            rata_waktu_penanganan_hari: None,
            per_status: ReportStatus::ALL
                .into_iter()
                .map(|status| StatusCountDto { status, count: 0 })
                .collect(),
            per_kategori: Vec::new(),
            per_fasilitas: Vec::new(),
        }
    }
}
