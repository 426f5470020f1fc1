//! Dashboard aggregate models

use serde::{Deserialize, Serialize};

use crate::types::mean;

/// Vegetation health band of a lahan by its latest NDVI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NdviHealth {
    Critical,
    NeedsAttention,
    Healthy,
}

impl NdviHealth {
    pub fn classify(ndvi: f64) -> Self {
        if ndvi < 0.6 {
            NdviHealth::Critical
        } else if ndvi < 0.75 {
            NdviHealth::NeedsAttention
        } else {
            NdviHealth::Healthy
        }
    }
}

/// Relative drop of mean NDVI that raises the decline flag
pub const NDVI_DECLINE_THRESHOLD: f64 = 0.10;

/// Health counts over all lahan of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NdviSummary {
    pub sektor_kritis: i64,
    pub perlu_perhatian: i64,
    pub sektor_sehat: i64,
    #[serde(rename = "penurunanNdvi10Persen")]
    pub penurunan_ndvi_10_persen: bool,
}

impl NdviSummary {
    /// Classify the latest NDVI of each lahan.
    ///
    /// `previous` holds the NDVI of the month before the latest one for
    /// every lahan that has one. The decline flag is raised when the mean of
    /// `latest` is more than 10% below the mean of `previous`.
    pub fn from_readings(latest: &[f64], previous: &[f64]) -> Self {
        let mut summary = NdviSummary::default();
        for &ndvi in latest {
            match NdviHealth::classify(ndvi) {
                NdviHealth::Critical => summary.sektor_kritis += 1,
                NdviHealth::NeedsAttention => summary.perlu_perhatian += 1,
                NdviHealth::Healthy => summary.sektor_sehat += 1,
            }
        }

        summary.penurunan_ndvi_10_persen = match (mean(latest), mean(previous)) {
            (Some(now), Some(before)) if before > 0.0 => {
                (before - now) / before > NDVI_DECLINE_THRESHOLD
            }
            _ => false,
        };

        summary
    }
}

/// A point on the monthly production chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub value: f64,
}
