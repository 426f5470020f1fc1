//! Read access used by the prediction pipeline
//!
//! The pipeline depends on these traits rather than on a pool so it can be
//! exercised without a database.

use std::future::Future;

use shared::HistoricObservation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::lahan::{Lahan, ObservationRow};

/// Lookup of plots by owner
pub trait LahanRepository: Send + Sync {
    /// The lahan `lahan_id` if it exists and belongs to `user_id`
    fn find_owned(
        &self,
        user_id: Uuid,
        lahan_id: Uuid,
    ) -> impl Future<Output = AppResult<Option<Lahan>>> + Send;
}

/// Lookup of monthly observations
pub trait HistoryRepository: Send + Sync {
    /// The `limit` most recent observations of a lahan, oldest first
    fn recent_observations(
        &self,
        lahan_id: Uuid,
        limit: usize,
    ) -> impl Future<Output = AppResult<Vec<HistoricObservation>>> + Send;
}

/// Postgres implementation of both repositories
#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl LahanRepository for PgRepository {
    async fn find_owned(&self, user_id: Uuid, lahan_id: Uuid) -> AppResult<Option<Lahan>> {
        let lahan = sqlx::query_as::<_, Lahan>(
            r#"
            SELECT id, user_id, nama_lahan, penanggung_jawab, jenis_tanah,
                   sistem_irigasi, lahan_kabupaten, lat, lon, created_at, updated_at
            FROM lahan
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(lahan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(lahan)
    }
}

impl HistoryRepository for PgRepository {
    async fn recent_observations(
        &self,
        lahan_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<HistoricObservation>> {
        let rows = sqlx::query_as::<_, ObservationRow>(
            r#"
            SELECT id, lahan_id, bulan, ndvi, pupuk_kg_per_ha, umur_tanaman_tahun,
                   curah_hujan_mm, suhu_rata2_c, produktivitas_ton_per_ha
            FROM data_historis
            WHERE lahan_id = $1
            ORDER BY bulan DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(lahan_id)
        .bind(limit as i64)
        .fetch_all(&self.db)
        .await?;

        let observations = rows
            .into_iter()
            .rev()
            .map(HistoricObservation::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(observations)
    }
}
