//! Estimate ("estimasi") service: stored yield predictions and their accuracy

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    accuracy_percent, first_of_month, month_name_id, validate_non_negative,
    validate_prediction_value, ConfidenceLevel, EstimateHistoryEntry, EstimateSummary,
    LatestEstimate, PredictionStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Estimate service for recording and summarising predictions
#[derive(Clone)]
pub struct EstimateService {
    db: PgPool,
}

/// A stored prediction
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Prediksi {
    pub id: Uuid,
    pub lahan_id: Uuid,
    pub bulan: NaiveDate,
    pub prediksi_ton_per_ha: f64,
    pub aktual_ton_per_ha: Option<f64>,
    pub akurasi: Option<f64>,
    pub status_prediksi: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a prediction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPredictionInput {
    pub lahan_id: Uuid,
    pub bulan: NaiveDate,
    pub prediksi: f64,
    pub aktual: Option<f64>,
    pub status: Option<String>,
}

/// Query filters for the estimate history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimateHistoryFilter {
    pub tahun: Option<i32>,
    pub bulan: Option<u32>,
    /// Lahan id
    pub blok: Option<Uuid>,
}

/// Derived columns of a new prediction row
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPrediction {
    pub bulan: NaiveDate,
    pub akurasi: Option<f64>,
    pub status: String,
}

impl RecordPredictionInput {
    /// Validate values and derive accuracy, status and target month
    pub fn prepare(&self) -> AppResult<PreparedPrediction> {
        validate_prediction_value(self.prediksi).map_err(|msg| {
            AppError::validation("prediksi", msg, "Nilai prediksi harus lebih dari 0")
        })?;
        if let Some(aktual) = self.aktual {
            validate_non_negative(aktual).map_err(|msg| {
                AppError::validation("aktual", msg, "Nilai aktual tidak boleh negatif")
            })?;
        }

        let status = match &self.status {
            Some(status) if !status.trim().is_empty() => status.trim().to_string(),
            _ => PredictionStatus::for_actual(self.aktual).to_string(),
        };

        Ok(PreparedPrediction {
            bulan: first_of_month(self.bulan),
            akurasi: self
                .aktual
                .and_then(|aktual| accuracy_percent(aktual, self.prediksi)),
            status,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LatestRow {
    prediksi_ton_per_ha: f64,
    akurasi: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    nama_lahan: String,
    bulan: NaiveDate,
    prediksi_ton_per_ha: f64,
    aktual_ton_per_ha: Option<f64>,
    akurasi: Option<f64>,
    status_prediksi: String,
}

impl From<HistoryRow> for EstimateHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        EstimateHistoryEntry {
            blok: row.nama_lahan,
            tahun: row.bulan.year(),
            bulan: month_name_id(row.bulan.month()).to_string(),
            estimasi_ton: row.prediksi_ton_per_ha,
            aktual_ton: row.aktual_ton_per_ha,
            akurasi_persen: row.akurasi,
            status: Some(row.status_prediksi),
            kepercayaan: ConfidenceLevel::from_accuracy(row.akurasi),
            prediksi_id: row.id,
        }
    }
}

impl EstimateService {
    /// Create a new EstimateService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Store a prediction for a lahan owned by the user
    pub async fn record_prediction(
        &self,
        user_id: Uuid,
        input: RecordPredictionInput,
    ) -> AppResult<Prediksi> {
        let prepared = input.prepare()?;

        let owned: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM lahan WHERE id = $1 AND user_id = $2")
                .bind(input.lahan_id)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;
        if owned.is_none() {
            return Err(AppError::NotFound("Lahan".to_string()));
        }

        let prediksi = sqlx::query_as::<_, Prediksi>(
            r#"
            INSERT INTO prediksi (lahan_id, bulan, prediksi_ton_per_ha, aktual_ton_per_ha,
                                  akurasi, status_prediksi)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, lahan_id, bulan, prediksi_ton_per_ha, aktual_ton_per_ha,
                      akurasi, status_prediksi, created_at
            "#,
        )
        .bind(input.lahan_id)
        .bind(prepared.bulan)
        .bind(input.prediksi)
        .bind(input.aktual)
        .bind(prepared.akurasi)
        .bind(&prepared.status)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Recorded prediction {} for lahan {} ({})",
            prediksi.id,
            prediksi.lahan_id,
            prediksi.status_prediksi
        );
        Ok(prediksi)
    }

    /// Headline numbers over the latest prediction of every lahan
    pub async fn estimate_summary(&self, user_id: Uuid) -> AppResult<EstimateSummary> {
        let (total_lahan,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lahan WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        let latest = sqlx::query_as::<_, LatestRow>(
            r#"
            SELECT DISTINCT ON (p.lahan_id) p.prediksi_ton_per_ha, p.akurasi
            FROM prediksi p
            JOIN lahan l ON l.id = p.lahan_id
            WHERE l.user_id = $1
            ORDER BY p.lahan_id, p.bulan DESC, p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let latest: Vec<LatestEstimate> = latest
            .into_iter()
            .map(|row| LatestEstimate {
                predicted: row.prediksi_ton_per_ha,
                accuracy: row.akurasi,
            })
            .collect();

        Ok(EstimateSummary::from_latest(&latest, total_lahan))
    }

    /// Prediction history, newest month first then by lahan name
    pub async fn estimate_history(
        &self,
        user_id: Uuid,
        filter: EstimateHistoryFilter,
    ) -> AppResult<Vec<EstimateHistoryEntry>> {
        if let Some(bulan) = filter.bulan {
            if !(1..=12).contains(&bulan) {
                return Err(AppError::validation(
                    "bulan",
                    "Month must be between 1 and 12",
                    "Bulan harus di antara 1 dan 12",
                ));
            }
        }

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT p.id, l.nama_lahan, p.bulan, p.prediksi_ton_per_ha,
                   p.aktual_ton_per_ha, p.akurasi, p.status_prediksi
            FROM prediksi p
            JOIN lahan l ON l.id = p.lahan_id
            WHERE l.user_id = $1
              AND ($2::INT IS NULL OR EXTRACT(YEAR FROM p.bulan) = $2)
              AND ($3::INT IS NULL OR EXTRACT(MONTH FROM p.bulan) = $3)
              AND ($4::UUID IS NULL OR p.lahan_id = $4)
            ORDER BY p.bulan DESC, l.nama_lahan ASC
            "#,
        )
        .bind(user_id)
        .bind(filter.tahun)
        .bind(filter.bulan.map(|b| b as i32))
        .bind(filter.blok)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(EstimateHistoryEntry::from).collect())
    }
}
