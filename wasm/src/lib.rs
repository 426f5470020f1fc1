//! WebAssembly module for the Saw-it Plantation Platform
//!
//! Provides client-side computation for:
//! - Previewing the feature record sent to the yield predictor
//! - Estimate accuracy and confidence labels
//! - NDVI health and production bands
//! - Form validation before observations are submitted

use shared::{
    accuracy_percent, build_feature_record, validate_ndvi, validate_non_negative,
    validate_temperature, AttributeOverrides, ConfidenceLevel, HistoricObservation,
    LahanAttributes, NdviHealth, PredictRequest, ProductionStatus,
};
use wasm_bindgen::prelude::*;

/// Log an error to the browser console and hand it back to JavaScript
fn to_js_error(message: String) -> JsValue {
    web_sys::console::error_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn preview_payload(attributes_json: &str, history_json: &str) -> Result<String, String> {
    let overrides: AttributeOverrides = serde_json::from_str(attributes_json)
        .map_err(|e| format!("Invalid attributes JSON: {}", e))?;
    let history: Vec<HistoricObservation> = serde_json::from_str(history_json)
        .map_err(|e| format!("Invalid history JSON: {}", e))?;

    let attributes = overrides.apply_to(&LahanAttributes::default());
    let record = build_feature_record(&attributes, history).map_err(|e| e.to_string())?;

    serde_json::to_string(&PredictRequest::single(record))
        .map_err(|e| format!("Failed to serialize payload: {}", e))
}

/// Build the `{ "instances": [...] }` payload for a lahan from its history.
///
/// `attributes_json` may omit any categorical attribute; omitted ones take
/// the platform defaults.
#[wasm_bindgen]
pub fn preview_feature_record(attributes_json: &str, history_json: &str) -> Result<String, JsValue> {
    preview_payload(attributes_json, history_json).map_err(to_js_error)
}

/// Accuracy of an estimate in percent, one decimal. NaN when undefined.
#[wasm_bindgen]
pub fn calculate_accuracy(actual: f64, predicted: f64) -> f64 {
    accuracy_percent(actual, predicted).unwrap_or(f64::NAN)
}

fn confidence_label(accuracy: Option<f64>) -> &'static str {
    match ConfidenceLevel::from_accuracy(accuracy) {
        ConfidenceLevel::High => "Tinggi",
        ConfidenceLevel::Medium => "Sedang",
        ConfidenceLevel::Low => "Rendah",
        ConfidenceLevel::Unknown => "N/A",
    }
}

/// Confidence label for an accuracy percentage; NaN means no accuracy
#[wasm_bindgen]
pub fn classify_confidence(accuracy: f64) -> String {
    let accuracy = Some(accuracy).filter(|a| a.is_finite());
    confidence_label(accuracy).to_string()
}

/// NDVI health band: `kritis`, `perlu_perhatian` or `sehat`
#[wasm_bindgen]
pub fn classify_ndvi(ndvi: f64) -> String {
    match NdviHealth::classify(ndvi) {
        NdviHealth::Critical => "kritis",
        NdviHealth::NeedsAttention => "perlu_perhatian",
        NdviHealth::Healthy => "sehat",
    }
    .to_string()
}

fn production_label(predicted: Option<f64>) -> &'static str {
    match ProductionStatus::from_prediction(predicted) {
        ProductionStatus::High => "Produksi Tinggi",
        ProductionStatus::Medium => "Produksi Sedang",
        ProductionStatus::Low => "Produksi Rendah",
        ProductionStatus::NoPrediction => "Belum Ada Prediksi",
    }
}

/// Production band for a predicted yield; NaN means no prediction
#[wasm_bindgen]
pub fn classify_production(predicted: f64) -> String {
    let predicted = Some(predicted).filter(|p| p.is_finite());
    production_label(predicted).to_string()
}

/// Check an observation form before it is submitted
#[wasm_bindgen]
pub fn validate_observation(
    ndvi: f64,
    pupuk_kg_per_ha: f64,
    umur_tanaman_tahun: f64,
    curah_hujan_mm: f64,
    suhu_rata2_c: f64,
    produktivitas_ton_per_ha: f64,
) -> bool {
    validate_ndvi(ndvi).is_ok()
        && validate_temperature(suhu_rata2_c).is_ok()
        && [
            pupuk_kg_per_ha,
            umur_tanaman_tahun,
            curah_hujan_mm,
            produktivitas_ton_per_ha,
        ]
        .into_iter()
        .all(|value| validate_non_negative(value).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = r#"[
        {"bulan":"2024-03-01","NDVI":0.75,"pupuk_kg_per_ha":150,"umur_tanaman_tahun":8.4,
         "curah_hujan_mm":220,"suhu_rata2_c":26.5,"produktivitas_ton_per_ha":2.2},
        {"bulan":"2024-01-01","NDVI":0.72,"pupuk_kg_per_ha":135,"umur_tanaman_tahun":8.2,
         "curah_hujan_mm":210,"suhu_rata2_c":26.1,"produktivitas_ton_per_ha":2.0},
        {"bulan":"2024-02-01","NDVI":0.73,"pupuk_kg_per_ha":140,"umur_tanaman_tahun":8.3,
         "curah_hujan_mm":190,"suhu_rata2_c":26.8,"produktivitas_ton_per_ha":2.1}
    ]"#;

    #[test]
    fn test_preview_payload() {
        let payload = preview_payload(r#"{"jenis_tanah":"Gambut"}"#, HISTORY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let instance = &json["instances"][0];

        assert_eq!(instance["NDVI_lag1"], 0.75);
        assert_eq!(instance["jenis_tanah"], "Gambut");
        assert_eq!(instance["penanggung_jawab"], "Tim A");
    }

    #[test]
    fn test_preview_rejects_empty_history() {
        let err = preview_payload("{}", "[]").unwrap_err();
        assert!(err.contains("No historical data"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(classify_confidence(97.0), "Tinggi");
        assert_eq!(classify_confidence(f64::NAN), "N/A");
        assert_eq!(classify_ndvi(0.55), "kritis");
        assert_eq!(classify_ndvi(0.8), "sehat");
        assert_eq!(classify_production(35.0), "Produksi Tinggi");
        assert_eq!(classify_production(f64::NAN), "Belum Ada Prediksi");
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(calculate_accuracy(2.4, 2.5), 96.0);
        assert!(calculate_accuracy(2.4, 0.0).is_nan());
    }

    #[test]
    fn test_validate_observation() {
        assert!(validate_observation(0.75, 150.0, 8.4, 220.0, 26.5, 2.2));
        assert!(!validate_observation(1.5, 150.0, 8.4, 220.0, 26.5, 2.2));
        assert!(!validate_observation(0.75, -1.0, 8.4, 220.0, 26.5, 2.2));
    }
}
