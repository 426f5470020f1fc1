//! Yield prediction and estimate models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{mean, round_dp};

/// What the prediction endpoint hands back to the caller.
///
/// The last realised productivity is included as a baseline so the caller
/// can judge how plausible the prediction is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionOutcome {
    #[serde(rename = "lahanId")]
    pub lahan_id: Uuid,
    pub predicted_productivity_ton_per_ha: f64,
    pub last_actual_productivity: f64,
    pub last_month: NaiveDate,
}

/// Lifecycle state of a stored estimate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PredictionStatus {
    #[serde(rename = "Selesai")]
    Completed,
    #[serde(rename = "Menunggu Aktual")]
    AwaitingActual,
}

impl PredictionStatus {
    /// Default status for a new estimate
    pub fn for_actual(actual: Option<f64>) -> Self {
        if actual.is_some() {
            PredictionStatus::Completed
        } else {
            PredictionStatus::AwaitingActual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Completed => "Selesai",
            PredictionStatus::AwaitingActual => "Menunggu Aktual",
        }
    }
}

impl std::fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accuracy of an estimate as `actual / predicted * 100`, one decimal.
///
/// `None` when the prediction is zero or either value is not finite.
pub fn accuracy_percent(actual: f64, predicted: f64) -> Option<f64> {
    if predicted == 0.0 || !actual.is_finite() || !predicted.is_finite() {
        return None;
    }
    Some(round_dp(actual / predicted * 100.0, 1))
}

/// Confidence label shown next to an estimate in the history table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfidenceLevel {
    #[serde(rename = "Tinggi")]
    High,
    #[serde(rename = "Sedang")]
    Medium,
    #[serde(rename = "Rendah")]
    Low,
    #[serde(rename = "N/A")]
    Unknown,
}

impl ConfidenceLevel {
    pub fn from_accuracy(accuracy: Option<f64>) -> Self {
        match accuracy {
            Some(a) if a > 95.0 => ConfidenceLevel::High,
            Some(a) if a > 85.0 => ConfidenceLevel::Medium,
            Some(_) => ConfidenceLevel::Low,
            None => ConfidenceLevel::Unknown,
        }
    }
}

/// Production band of a lahan by its latest predicted yield (ton/ha)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProductionStatus {
    #[serde(rename = "Produksi Tinggi")]
    High,
    #[serde(rename = "Produksi Sedang")]
    Medium,
    #[serde(rename = "Produksi Rendah")]
    Low,
    #[serde(rename = "Belum Ada Prediksi")]
    NoPrediction,
}

impl ProductionStatus {
    pub fn from_prediction(predicted: Option<f64>) -> Self {
        match predicted {
            Some(p) if p > 30.0 => ProductionStatus::High,
            Some(p) if p > 20.0 => ProductionStatus::Medium,
            Some(_) => ProductionStatus::Low,
            None => ProductionStatus::NoPrediction,
        }
    }
}

/// Latest estimate of one lahan, input to [`EstimateSummary::from_latest`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestEstimate {
    pub predicted: f64,
    pub accuracy: Option<f64>,
}

/// Headline numbers of the estimate page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    pub total_estimasi: f64,
    pub akurasi_rata_rata: f64,
    pub pembaruan_berikutnya: String,
    pub cakupan_blok: String,
    pub persentase_cakupan: i64,
}

/// Placeholder until estimates are refreshed on a schedule
pub const NEXT_UPDATE_LABEL: &str = "3 hari";

impl EstimateSummary {
    /// Summarise the latest estimate of each covered lahan against the
    /// total number of lahan the user owns.
    pub fn from_latest(latest: &[LatestEstimate], total_lahan: i64) -> Self {
        let covered = latest.len() as i64;
        let total_estimasi: f64 = latest.iter().map(|e| e.predicted).sum();
        let accuracies: Vec<f64> = latest.iter().filter_map(|e| e.accuracy).collect();
        let akurasi_rata_rata = mean(&accuracies).unwrap_or(0.0);

        let persentase_cakupan = if total_lahan > 0 {
            (covered as f64 / total_lahan as f64 * 100.0).round() as i64
        } else {
            0
        };

        Self {
            total_estimasi: round_dp(total_estimasi, 1),
            akurasi_rata_rata: round_dp(akurasi_rata_rata, 1),
            pembaruan_berikutnya: NEXT_UPDATE_LABEL.to_string(),
            cakupan_blok: format!("{}/{}", covered, total_lahan),
            persentase_cakupan,
        }
    }
}

/// One row of the estimate history table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateHistoryEntry {
    pub blok: String,
    pub tahun: i32,
    pub bulan: String,
    pub estimasi_ton: f64,
    pub aktual_ton: Option<f64>,
    pub akurasi_persen: Option<f64>,
    pub status: Option<String>,
    pub kepercayaan: ConfidenceLevel,
    pub prediksi_id: Uuid,
}
