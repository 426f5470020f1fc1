//! Dashboard aggregates over a user's lahan

use chrono::{Months, NaiveDate, Utc};
use serde::Serialize;
use shared::{first_of_month, month_label, round_dp, NdviSummary, ProductionStatus, TrendPoint};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// One lahan on the dashboard map with its latest prediction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotOverview {
    pub lahan_id: Uuid,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub prediksi_terbaru: Option<f64>,
    pub bulan_prediksi: Option<NaiveDate>,
    pub status_prediksi: Option<String>,
    pub status_produksi: ProductionStatus,
}

#[derive(Debug, sqlx::FromRow)]
struct PlotOverviewRow {
    id: Uuid,
    nama_lahan: String,
    lat: Option<f64>,
    lon: Option<f64>,
    prediksi_ton_per_ha: Option<f64>,
    bulan_prediksi: Option<NaiveDate>,
    status_prediksi: Option<String>,
}

impl From<PlotOverviewRow> for PlotOverview {
    fn from(row: PlotOverviewRow) -> Self {
        PlotOverview {
            lahan_id: row.id,
            name: row.nama_lahan,
            lat: row.lat,
            lon: row.lon,
            prediksi_terbaru: row.prediksi_ton_per_ha,
            bulan_prediksi: row.bulan_prediksi,
            status_prediksi: row.status_prediksi,
            status_produksi: ProductionStatus::from_prediction(row.prediksi_ton_per_ha),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RankedNdvi {
    ndvi: f64,
    rn: i64,
}

/// Split ranked readings into latest (rank 1) and previous (rank 2) values
fn split_readings(rows: &[RankedNdvi]) -> (Vec<f64>, Vec<f64>) {
    let latest = rows.iter().filter(|r| r.rn == 1).map(|r| r.ndvi).collect();
    let previous = rows.iter().filter(|r| r.rn == 2).map(|r| r.ndvi).collect();
    (latest, previous)
}

/// First day of the month one year before `today`
pub fn trend_start(today: NaiveDate) -> Option<NaiveDate> {
    first_of_month(today).checked_sub_months(Months::new(12))
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// NDVI health counts over the latest observation of every lahan
    pub async fn ndvi_summary(&self, user_id: Uuid) -> AppResult<NdviSummary> {
        let rows = sqlx::query_as::<_, RankedNdvi>(
            r#"
            SELECT ndvi, rn FROM (
                SELECT d.ndvi,
                       ROW_NUMBER() OVER (
                           PARTITION BY d.lahan_id
                           ORDER BY d.bulan DESC, d.created_at DESC
                       ) AS rn
                FROM data_historis d
                JOIN lahan l ON l.id = d.lahan_id
                WHERE l.user_id = $1 AND d.ndvi IS NOT NULL
            ) ranked
            WHERE rn <= 2
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let (latest, previous) = split_readings(&rows);
        Ok(NdviSummary::from_readings(&latest, &previous))
    }

    /// Mean monthly productivity over the last year, oldest month first
    pub async fn production_trend(&self, user_id: Uuid) -> AppResult<Vec<TrendPoint>> {
        let today = Utc::now().date_naive();
        let start = trend_start(today)
            .ok_or_else(|| AppError::Internal("Failed to compute trend start".to_string()))?;

        let rows: Vec<(NaiveDate, Option<f64>)> = sqlx::query_as(
            r#"
            SELECT date_trunc('month', d.bulan)::DATE AS bulan,
                   AVG(d.produktivitas_ton_per_ha) AS avg_produksi
            FROM data_historis d
            JOIN lahan l ON l.id = d.lahan_id
            WHERE l.user_id = $1
              AND d.bulan >= $2 AND d.bulan <= $3
              AND d.produktivitas_ton_per_ha IS NOT NULL
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(bulan, avg)| {
                avg.map(|value| TrendPoint {
                    month: month_label(bulan),
                    value: round_dp(value, 2),
                })
            })
            .collect())
    }

    /// Every lahan with its latest prediction and production band
    pub async fn plot_overview(&self, user_id: Uuid) -> AppResult<Vec<PlotOverview>> {
        let rows = sqlx::query_as::<_, PlotOverviewRow>(
            r#"
            SELECT l.id, l.nama_lahan, l.lat, l.lon,
                   p.prediksi_ton_per_ha, p.bulan AS bulan_prediksi, p.status_prediksi
            FROM lahan l
            LEFT JOIN LATERAL (
                SELECT prediksi_ton_per_ha, bulan, status_prediksi
                FROM prediksi
                WHERE lahan_id = l.id
                ORDER BY bulan DESC, created_at DESC
                LIMIT 1
            ) p ON TRUE
            WHERE l.user_id = $1
            ORDER BY l.nama_lahan ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PlotOverview::from).collect())
    }
}
