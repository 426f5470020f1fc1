//! Lahan management service: plots and their monthly observations

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    first_of_month, validate_coordinates, validate_ndvi, validate_non_negative,
    validate_temperature, AttributeOverrides, FeatureError, HistoricObservation, LahanAttributes,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{validate_input, AppError, AppResult};

/// Lahan service for managing plantation plots
#[derive(Clone)]
pub struct LahanService {
    db: PgPool,
    defaults: LahanAttributes,
}

/// Lahan information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Lahan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nama_lahan: String,
    pub penanggung_jawab: String,
    pub jenis_tanah: String,
    pub sistem_irigasi: String,
    pub lahan_kabupaten: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lahan {
    /// The categorical attributes fed to the yield predictor
    pub fn attributes(&self) -> LahanAttributes {
        LahanAttributes {
            penanggung_jawab: self.penanggung_jawab.clone(),
            jenis_tanah: self.jenis_tanah.clone(),
            sistem_irigasi: self.sistem_irigasi.clone(),
            lahan_kabupaten: self.lahan_kabupaten.clone(),
        }
    }
}

/// A stored `data_historis` row. Numeric columns may be NULL.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ObservationRow {
    pub id: Uuid,
    pub lahan_id: Uuid,
    pub bulan: NaiveDate,
    #[serde(rename = "NDVI")]
    pub ndvi: Option<f64>,
    pub pupuk_kg_per_ha: Option<f64>,
    pub umur_tanaman_tahun: Option<f64>,
    pub curah_hujan_mm: Option<f64>,
    pub suhu_rata2_c: Option<f64>,
    pub produktivitas_ton_per_ha: Option<f64>,
}

impl TryFrom<ObservationRow> for HistoricObservation {
    type Error = FeatureError;

    fn try_from(row: ObservationRow) -> Result<Self, Self::Error> {
        let month = row.bulan;
        let required = |field: &'static str, value: Option<f64>| {
            value.ok_or(FeatureError::IncompleteObservation { month, field })
        };

        Ok(HistoricObservation {
            bulan: row.bulan,
            ndvi: required("NDVI", row.ndvi)?,
            pupuk_kg_per_ha: required("pupuk_kg_per_ha", row.pupuk_kg_per_ha)?,
            umur_tanaman_tahun: required("umur_tanaman_tahun", row.umur_tanaman_tahun)?,
            curah_hujan_mm: required("curah_hujan_mm", row.curah_hujan_mm)?,
            suhu_rata2_c: required("suhu_rata2_c", row.suhu_rata2_c)?,
            produktivitas_ton_per_ha: required(
                "produktivitas_ton_per_ha",
                row.produktivitas_ton_per_ha,
            )?,
        })
    }
}

/// Input for creating a lahan
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLahanInput {
    #[validate(length(min = 1, max = 120, message = "Lahan name must be 1-120 characters"))]
    #[serde(alias = "name")]
    pub nama_lahan: String,
    #[serde(flatten)]
    pub attributes: AttributeOverrides,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: Option<f64>,
}

/// Input for updating a lahan. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateLahanInput {
    #[validate(length(min = 1, max = 120, message = "Lahan name must be 1-120 characters"))]
    #[serde(alias = "name")]
    pub nama_lahan: Option<String>,
    #[serde(flatten)]
    pub attributes: AttributeOverrides,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: Option<f64>,
}

/// Input for recording one monthly observation
#[derive(Debug, Clone, Deserialize)]
pub struct RecordObservationInput {
    pub bulan: NaiveDate,
    #[serde(rename = "NDVI")]
    pub ndvi: f64,
    pub pupuk_kg_per_ha: f64,
    pub umur_tanaman_tahun: f64,
    pub curah_hujan_mm: f64,
    pub suhu_rata2_c: f64,
    pub produktivitas_ton_per_ha: f64,
}

impl RecordObservationInput {
    /// Range checks; the month itself is normalised, not rejected
    pub fn check(&self) -> AppResult<()> {
        validate_ndvi(self.ndvi)
            .map_err(|msg| AppError::validation("NDVI", msg, "NDVI harus di antara -1 dan 1"))?;
        validate_temperature(self.suhu_rata2_c).map_err(|msg| {
            AppError::validation("suhu_rata2_c", msg, "Suhu rata-rata tidak wajar")
        })?;

        let quantities = [
            ("pupuk_kg_per_ha", self.pupuk_kg_per_ha),
            ("umur_tanaman_tahun", self.umur_tanaman_tahun),
            ("curah_hujan_mm", self.curah_hujan_mm),
            ("produktivitas_ton_per_ha", self.produktivitas_ton_per_ha),
        ];
        for (field, value) in quantities {
            validate_non_negative(value).map_err(|msg| {
                AppError::validation(field, msg, &format!("{} tidak boleh negatif", field))
            })?;
        }

        Ok(())
    }
}

/// Input for the development-only demo seed
#[derive(Debug, Default, Deserialize)]
pub struct SeedLahanInput {
    #[serde(alias = "name")]
    pub nama_lahan: Option<String>,
    #[serde(flatten)]
    pub attributes: AttributeOverrides,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Demo lahan with its seeded history
#[derive(Debug, Serialize)]
pub struct SeededLahan {
    pub lahan: Lahan,
    pub data_historis: Vec<ObservationRow>,
}

const DEMO_LAHAN_NAME: &str = "Lahan Dummy";
const DEMO_LAT: f64 = -2.5;
const DEMO_LON: f64 = 102.5;

impl SeedLahanInput {
    /// Name and coordinates for the demo lahan, falling back to the demo defaults
    pub fn resolve(&self) -> (String, f64, f64) {
        let name = self
            .nama_lahan
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEMO_LAHAN_NAME)
            .to_string();
        (
            name,
            self.lat.unwrap_or(DEMO_LAT),
            self.lon.unwrap_or(DEMO_LON),
        )
    }
}

/// Three months of demo history ending in the month of `today`
pub fn demo_history(today: NaiveDate) -> Option<Vec<HistoricObservation>> {
    let this_month = first_of_month(today);
    let last_month = this_month.checked_sub_months(Months::new(1))?;
    let two_months_ago = this_month.checked_sub_months(Months::new(2))?;

    let row = |bulan, ndvi, pupuk, umur, hujan, suhu, prod| HistoricObservation {
        bulan,
        ndvi,
        pupuk_kg_per_ha: pupuk,
        umur_tanaman_tahun: umur,
        curah_hujan_mm: hujan,
        suhu_rata2_c: suhu,
        produktivitas_ton_per_ha: prod,
    };

    Some(vec![
        row(two_months_ago, 0.72, 135.0, 8.2, 210.0, 26.1, 2.0),
        row(last_month, 0.73, 140.0, 8.3, 190.0, 26.8, 2.1),
        row(this_month, 0.75, 150.0, 8.4, 220.0, 26.5, 2.2),
    ])
}

const LAHAN_COLUMNS: &str = "id, user_id, nama_lahan, penanggung_jawab, jenis_tanah, \
     sistem_irigasi, lahan_kabupaten, lat, lon, created_at, updated_at";

const OBSERVATION_COLUMNS: &str = "id, lahan_id, bulan, ndvi, pupuk_kg_per_ha, \
     umur_tanaman_tahun, curah_hujan_mm, suhu_rata2_c, produktivitas_ton_per_ha";

impl LahanService {
    /// Create a new LahanService; `defaults` fill attributes omitted on create
    pub fn new(db: PgPool, defaults: LahanAttributes) -> Self {
        Self { db, defaults }
    }

    /// Get all lahan of a user ordered by name
    pub async fn list_lahan(&self, user_id: Uuid) -> AppResult<Vec<Lahan>> {
        let lahan = sqlx::query_as::<_, Lahan>(&format!(
            "SELECT {} FROM lahan WHERE user_id = $1 ORDER BY nama_lahan ASC",
            LAHAN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lahan)
    }

    /// Get a lahan owned by the user
    pub async fn get_lahan(&self, user_id: Uuid, lahan_id: Uuid) -> AppResult<Lahan> {
        sqlx::query_as::<_, Lahan>(&format!(
            "SELECT {} FROM lahan WHERE id = $1 AND user_id = $2",
            LAHAN_COLUMNS
        ))
        .bind(lahan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lahan".to_string()))
    }

    /// Create a new lahan
    pub async fn create_lahan(&self, user_id: Uuid, input: CreateLahanInput) -> AppResult<Lahan> {
        validate_input(&input)?;
        check_name(&input.nama_lahan)?;
        check_coordinates(input.lat, input.lon)?;

        let attributes = input.attributes.apply_to(&self.defaults);

        let lahan = sqlx::query_as::<_, Lahan>(&format!(
            r#"
            INSERT INTO lahan (user_id, nama_lahan, penanggung_jawab, jenis_tanah,
                               sistem_irigasi, lahan_kabupaten, lat, lon)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            LAHAN_COLUMNS
        ))
        .bind(user_id)
        .bind(input.nama_lahan.trim())
        .bind(&attributes.penanggung_jawab)
        .bind(&attributes.jenis_tanah)
        .bind(&attributes.sistem_irigasi)
        .bind(&attributes.lahan_kabupaten)
        .bind(input.lat)
        .bind(input.lon)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created lahan {} for user {}", lahan.id, user_id);
        Ok(lahan)
    }

    /// Update name, categorical attributes or coordinates of a lahan
    pub async fn update_lahan(
        &self,
        user_id: Uuid,
        lahan_id: Uuid,
        input: UpdateLahanInput,
    ) -> AppResult<Lahan> {
        validate_input(&input)?;
        let current = self.get_lahan(user_id, lahan_id).await?;

        let nama_lahan = match input.nama_lahan {
            Some(name) => {
                check_name(&name)?;
                name.trim().to_string()
            }
            None => current.nama_lahan.clone(),
        };

        let (lat, lon) = match (input.lat, input.lon) {
            (None, None) => (current.lat, current.lon),
            (lat, lon) => (lat.or(current.lat), lon.or(current.lon)),
        };
        check_coordinates(lat, lon)?;

        let attributes = input.attributes.apply_to(&current.attributes());

        let lahan = sqlx::query_as::<_, Lahan>(&format!(
            r#"
            UPDATE lahan
            SET nama_lahan = $3, penanggung_jawab = $4, jenis_tanah = $5,
                sistem_irigasi = $6, lahan_kabupaten = $7, lat = $8, lon = $9,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            LAHAN_COLUMNS
        ))
        .bind(lahan_id)
        .bind(user_id)
        .bind(&nama_lahan)
        .bind(&attributes.penanggung_jawab)
        .bind(&attributes.jenis_tanah)
        .bind(&attributes.sistem_irigasi)
        .bind(&attributes.lahan_kabupaten)
        .bind(lat)
        .bind(lon)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lahan".to_string()))?;

        Ok(lahan)
    }

    /// Record one monthly observation for a lahan
    pub async fn record_observation(
        &self,
        user_id: Uuid,
        lahan_id: Uuid,
        input: RecordObservationInput,
    ) -> AppResult<ObservationRow> {
        input.check()?;
        self.get_lahan(user_id, lahan_id).await?;

        let row = sqlx::query_as::<_, ObservationRow>(&format!(
            r#"
            INSERT INTO data_historis (lahan_id, bulan, ndvi, pupuk_kg_per_ha,
                                       umur_tanaman_tahun, curah_hujan_mm,
                                       suhu_rata2_c, produktivitas_ton_per_ha)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            OBSERVATION_COLUMNS
        ))
        .bind(lahan_id)
        .bind(first_of_month(input.bulan))
        .bind(input.ndvi)
        .bind(input.pupuk_kg_per_ha)
        .bind(input.umur_tanaman_tahun)
        .bind(input.curah_hujan_mm)
        .bind(input.suhu_rata2_c)
        .bind(input.produktivitas_ton_per_ha)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    /// All observations of a lahan, oldest month first
    pub async fn list_observations(
        &self,
        user_id: Uuid,
        lahan_id: Uuid,
    ) -> AppResult<Vec<ObservationRow>> {
        self.get_lahan(user_id, lahan_id).await?;

        let rows = sqlx::query_as::<_, ObservationRow>(&format!(
            "SELECT {} FROM data_historis WHERE lahan_id = $1 ORDER BY bulan ASC, created_at ASC",
            OBSERVATION_COLUMNS
        ))
        .bind(lahan_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Create a demo lahan with three months of history (development only)
    pub async fn seed_demo_lahan(
        &self,
        user_id: Uuid,
        input: SeedLahanInput,
        development: bool,
    ) -> AppResult<SeededLahan> {
        if !development {
            return Err(AppError::Forbidden(
                "Demo data can only be seeded in development".to_string(),
            ));
        }
        check_coordinates(input.lat, input.lon)?;

        let history = demo_history(Utc::now().date_naive())
            .ok_or_else(|| AppError::Internal("Failed to compute demo months".to_string()))?;
        let (nama_lahan, lat, lon) = input.resolve();
        let attributes = input.attributes.apply_to(&self.defaults);

        let mut tx = self.db.begin().await?;

        let lahan = sqlx::query_as::<_, Lahan>(&format!(
            r#"
            INSERT INTO lahan (user_id, nama_lahan, penanggung_jawab, jenis_tanah,
                               sistem_irigasi, lahan_kabupaten, lat, lon)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            LAHAN_COLUMNS
        ))
        .bind(user_id)
        .bind(&nama_lahan)
        .bind(&attributes.penanggung_jawab)
        .bind(&attributes.jenis_tanah)
        .bind(&attributes.sistem_irigasi)
        .bind(&attributes.lahan_kabupaten)
        .bind(lat)
        .bind(lon)
        .fetch_one(&mut *tx)
        .await?;

        let mut data_historis = Vec::with_capacity(history.len());
        for obs in history {
            let row = sqlx::query_as::<_, ObservationRow>(&format!(
                r#"
                INSERT INTO data_historis (lahan_id, bulan, ndvi, pupuk_kg_per_ha,
                                           umur_tanaman_tahun, curah_hujan_mm,
                                           suhu_rata2_c, produktivitas_ton_per_ha)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {}
                "#,
                OBSERVATION_COLUMNS
            ))
            .bind(lahan.id)
            .bind(obs.bulan)
            .bind(obs.ndvi)
            .bind(obs.pupuk_kg_per_ha)
            .bind(obs.umur_tanaman_tahun)
            .bind(obs.curah_hujan_mm)
            .bind(obs.suhu_rata2_c)
            .bind(obs.produktivitas_ton_per_ha)
            .fetch_one(&mut *tx)
            .await?;
            data_historis.push(row);
        }

        tx.commit().await?;

        tracing::info!("Seeded demo lahan {} for user {}", lahan.id, user_id);
        Ok(SeededLahan {
            lahan,
            data_historis,
        })
    }
}

fn check_name(name: &str) -> AppResult<()> {
    shared::validate_lahan_name(name)
        .map_err(|msg| AppError::validation("nama_lahan", msg, "Nama lahan tidak boleh kosong"))
}

fn check_coordinates(lat: Option<f64>, lon: Option<f64>) -> AppResult<()> {
    validate_coordinates(lat, lon)
        .map_err(|msg| AppError::validation("lat", msg, "Koordinat tidak valid"))
}
