//! Monthly agronomic observations of a lahan

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One month of recorded data for a lahan (`data_historis`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricObservation {
    /// Observation month, stored as the first day of the month
    pub bulan: NaiveDate,
    #[serde(rename = "NDVI")]
    pub ndvi: f64,
    pub pupuk_kg_per_ha: f64,
    pub umur_tanaman_tahun: f64,
    pub curah_hujan_mm: f64,
    pub suhu_rata2_c: f64,
    /// Realised productivity, the ground truth for the model
    pub produktivitas_ton_per_ha: f64,
}

impl HistoricObservation {
    /// Numeric fields with the names the predictor knows them by
    pub fn numeric_fields(&self) -> [(&'static str, f64); 6] {
        [
            ("NDVI", self.ndvi),
            ("pupuk_kg_per_ha", self.pupuk_kg_per_ha),
            ("umur_tanaman_tahun", self.umur_tanaman_tahun),
            ("curah_hujan_mm", self.curah_hujan_mm),
            ("suhu_rata2_c", self.suhu_rata2_c),
            ("produktivitas_ton_per_ha", self.produktivitas_ton_per_ha),
        ]
    }
}
