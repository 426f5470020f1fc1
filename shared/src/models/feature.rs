//! Feature window builder for the yield predictor
//!
//! The external XGBoost service expects one flat instance per lahan built
//! from the most recent observation months:
//!
//! - current NDVI and fertiliser from the latest month, with the plant age
//!   projected one month ahead
//! - lag-1 NDVI, fertiliser and productivity
//! - unweighted means over the window for NDVI, fertiliser, rainfall and
//!   temperature
//! - the four categorical attributes of the lahan, unchanged
//!
//! Lag-1 values are read from the latest month itself, not from the month
//! before it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{HistoricObservation, LahanAttributes};

/// Number of most recent months that make up the rolling window
pub const WINDOW_SIZE: usize = 3;

/// One month expressed in years, used to project the plant age forward
pub const ONE_MONTH_IN_YEARS: f64 = 1.0 / 12.0;

/// Errors raised while assembling a feature record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("No historical data found for this lahan")]
    NoHistoricalData,

    #[error("Observation {month} has no usable value for {field}")]
    IncompleteObservation {
        month: NaiveDate,
        field: &'static str,
    },
}

/// The instance sent to the yield predictor.
///
/// Field names on the wire match the columns the model was trained on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRecord {
    #[serde(rename = "NDVI")]
    pub ndvi: f64,
    pub pupuk_kg_per_ha: f64,
    pub umur_tanaman_tahun: f64,
    pub curah_hujan_mm: f64,
    pub suhu_rata2_c: f64,
    #[serde(rename = "NDVI_lag1")]
    pub ndvi_lag1: f64,
    pub pupuk_lag1: f64,
    pub prod_lag1: f64,
    #[serde(rename = "NDVI_roll3")]
    pub ndvi_roll3: f64,
    pub pupuk_roll3: f64,
    #[serde(flatten)]
    pub attributes: LahanAttributes,
}

/// Request envelope expected by the predictor: `{ "instances": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictRequest {
    pub instances: Vec<FeatureRecord>,
}

impl PredictRequest {
    pub fn single(record: FeatureRecord) -> Self {
        Self {
            instances: vec![record],
        }
    }
}

/// Response body of the predictor: `{ "predictions": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub predictions: Vec<f64>,
}

impl PredictResponse {
    /// The prediction for our single instance. Extra entries are ignored;
    /// an empty list or a non-finite first value yields `None`.
    pub fn first_prediction(&self) -> Option<f64> {
        self.predictions.first().copied().filter(|p| p.is_finite())
    }
}

/// A chronologically ordered window of at most [`WINDOW_SIZE`] observations.
///
/// Construction guarantees the window is non-empty, sorted ascending by
/// month and free of non-finite values, so the last row is always the
/// latest month.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWindow {
    rows: Vec<HistoricObservation>,
}

impl FeatureWindow {
    /// Build a window from history supplied in any order.
    ///
    /// When more than [`WINDOW_SIZE`] rows are given only the most recent
    /// ones are kept. Rows sharing a month keep their supplied order.
    pub fn new(
        history: impl IntoIterator<Item = HistoricObservation>,
    ) -> Result<Self, FeatureError> {
        let mut rows: Vec<HistoricObservation> = history.into_iter().collect();
        if rows.is_empty() {
            return Err(FeatureError::NoHistoricalData);
        }

        rows.sort_by_key(|row| row.bulan);
        if rows.len() > WINDOW_SIZE {
            let excess = rows.len() - WINDOW_SIZE;
            rows.drain(..excess);
        }

        for row in &rows {
            let missing = row
                .numeric_fields()
                .into_iter()
                .find(|(_, value)| !value.is_finite());
            if let Some((field, _)) = missing {
                return Err(FeatureError::IncompleteObservation {
                    month: row.bulan,
                    field,
                });
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[HistoricObservation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Never true for a constructed window
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The chronologically latest observation
    pub fn latest(&self) -> &HistoricObservation {
        &self.rows[self.rows.len() - 1]
    }

    /// Source row for the lag-1 features. Same row as [`Self::latest`].
    pub fn lag1(&self) -> &HistoricObservation {
        self.latest()
    }

    fn mean_of(&self, value: impl Fn(&HistoricObservation) -> f64) -> f64 {
        self.rows.iter().map(value).sum::<f64>() / self.rows.len() as f64
    }

    /// Assemble the feature record for this window
    pub fn to_record(&self, attributes: &LahanAttributes) -> FeatureRecord {
        let latest = self.latest();
        let lag1 = self.lag1();

        FeatureRecord {
            ndvi: latest.ndvi,
            pupuk_kg_per_ha: latest.pupuk_kg_per_ha,
            umur_tanaman_tahun: latest.umur_tanaman_tahun + ONE_MONTH_IN_YEARS,
            curah_hujan_mm: self.mean_of(|o| o.curah_hujan_mm),
            suhu_rata2_c: self.mean_of(|o| o.suhu_rata2_c),
            ndvi_lag1: lag1.ndvi,
            pupuk_lag1: lag1.pupuk_kg_per_ha,
            prod_lag1: lag1.produktivitas_ton_per_ha,
            ndvi_roll3: self.mean_of(|o| o.ndvi),
            pupuk_roll3: self.mean_of(|o| o.pupuk_kg_per_ha),
            attributes: attributes.clone(),
        }
    }
}

/// Build the feature record for a lahan from its recent history
pub fn build_feature_record(
    attributes: &LahanAttributes,
    history: impl IntoIterator<Item = HistoricObservation>,
) -> Result<FeatureRecord, FeatureError> {
    Ok(FeatureWindow::new(history)?.to_record(attributes))
}
