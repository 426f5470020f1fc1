//! Feature window property-based and unit tests
//!
//! Covers:
//! - order independence of the supplied history
//! - latest and lag-1 features read from the newest month
//! - rolling means over at most three months
//! - rejection of empty and incomplete windows

use chrono::{Months, NaiveDate};
use proptest::prelude::*;
use shared::{
    build_feature_record, FeatureError, FeatureWindow, HistoricObservation, LahanAttributes,
    PredictRequest, ONE_MONTH_IN_YEARS, WINDOW_SIZE,
};

// ============================================================================
// Helpers
// ============================================================================

fn month_at(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .checked_add_months(Months::new(offset as u32))
        .unwrap()
}

type Values = (f64, f64, f64, f64, f64, f64);

fn observation(bulan: NaiveDate, v: Values) -> HistoricObservation {
    HistoricObservation {
        bulan,
        ndvi: v.0,
        pupuk_kg_per_ha: v.1,
        umur_tanaman_tahun: v.2,
        curah_hujan_mm: v.3,
        suhu_rata2_c: v.4,
        produktivitas_ton_per_ha: v.5,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn values_strategy() -> impl Strategy<Value = Values> {
    (
        -1.0..=1.0f64,
        0.0..500.0f64,
        0.0..30.0f64,
        0.0..600.0f64,
        20.0..35.0f64,
        0.0..5.0f64,
    )
}

/// History with distinct months, oldest first
fn history_strategy() -> impl Strategy<Value = Vec<HistoricObservation>> {
    prop::collection::vec(values_strategy(), 1..=6).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| observation(month_at(i), v))
            .collect()
    })
}

/// Chronological history paired with a shuffled copy of it
fn shuffled_history_strategy(
) -> impl Strategy<Value = (Vec<HistoricObservation>, Vec<HistoricObservation>)> {
    history_strategy().prop_flat_map(|sorted| {
        let original = sorted.clone();
        Just(sorted)
            .prop_shuffle()
            .prop_map(move |shuffled| (original.clone(), shuffled))
    })
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Supplying the same rows in any order yields the same record
    #[test]
    fn test_order_independence((sorted, shuffled) in shuffled_history_strategy()) {
        let attributes = LahanAttributes::default();
        let from_sorted = build_feature_record(&attributes, sorted).unwrap();
        let from_shuffled = build_feature_record(&attributes, shuffled).unwrap();
        prop_assert_eq!(from_sorted, from_shuffled);
    }

    /// Latest and lag-1 features both come from the newest month
    #[test]
    fn test_latest_and_lag1_from_newest_month(history in history_strategy()) {
        let newest = history.last().unwrap().clone();
        let record = build_feature_record(&LahanAttributes::default(), history).unwrap();

        prop_assert_eq!(record.ndvi, newest.ndvi);
        prop_assert_eq!(record.pupuk_kg_per_ha, newest.pupuk_kg_per_ha);
        prop_assert_eq!(record.ndvi_lag1, newest.ndvi);
        prop_assert_eq!(record.pupuk_lag1, newest.pupuk_kg_per_ha);
        prop_assert_eq!(record.prod_lag1, newest.produktivitas_ton_per_ha);
        prop_assert!(close(
            record.umur_tanaman_tahun,
            newest.umur_tanaman_tahun + ONE_MONTH_IN_YEARS
        ));
    }

    /// Rolling features are means of the three newest months only
    #[test]
    fn test_rolling_means_over_window(history in history_strategy()) {
        let window: Vec<HistoricObservation> = history
            .iter()
            .rev()
            .take(WINDOW_SIZE)
            .cloned()
            .collect();
        let n = window.len() as f64;
        let mean = |f: fn(&HistoricObservation) -> f64| window.iter().map(f).sum::<f64>() / n;

        let record = build_feature_record(&LahanAttributes::default(), history).unwrap();

        prop_assert!(close(record.ndvi_roll3, mean(|o| o.ndvi)));
        prop_assert!(close(record.pupuk_roll3, mean(|o| o.pupuk_kg_per_ha)));
        prop_assert!(close(record.curah_hujan_mm, mean(|o| o.curah_hujan_mm)));
        prop_assert!(close(record.suhu_rata2_c, mean(|o| o.suhu_rata2_c)));
    }

    /// The window never holds more than three rows
    #[test]
    fn test_window_size_bound(history in history_strategy()) {
        let len = history.len();
        let window = FeatureWindow::new(history).unwrap();
        prop_assert_eq!(window.len(), len.min(WINDOW_SIZE));
        prop_assert!(!window.is_empty());
    }

    /// A non-finite value inside the window fails the whole build
    #[test]
    fn test_non_finite_value_in_window_is_rejected(
        mut history in history_strategy(),
        field in 0usize..6,
    ) {
        let last = history.len() - 1;
        let row = &mut history[last];
        match field {
            0 => row.ndvi = f64::NAN,
            1 => row.pupuk_kg_per_ha = f64::NAN,
            2 => row.umur_tanaman_tahun = f64::INFINITY,
            3 => row.curah_hujan_mm = f64::NAN,
            4 => row.suhu_rata2_c = f64::NEG_INFINITY,
            _ => row.produktivitas_ton_per_ha = f64::NAN,
        }
        let month = row.bulan;

        let err = FeatureWindow::new(history).unwrap_err();
        let names_month =
            matches!(err, FeatureError::IncompleteObservation { month: m, .. } if m == month);
        prop_assert!(names_month, "unexpected error {:?}", err);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

mod window_examples {
    use super::*;

    fn demo_window() -> Vec<HistoricObservation> {
        vec![
            observation(month_at(2), (0.75, 150.0, 8.4, 220.0, 26.5, 2.2)),
            observation(month_at(1), (0.73, 140.0, 8.3, 190.0, 26.8, 2.1)),
            observation(month_at(0), (0.72, 135.0, 8.2, 210.0, 26.1, 2.0)),
        ]
    }

    #[test]
    fn empty_history_is_rejected() {
        let err = build_feature_record(&LahanAttributes::default(), Vec::new()).unwrap_err();
        assert_eq!(err, FeatureError::NoHistoricalData);
    }

    #[test]
    fn reverse_order_input_uses_newest_as_lag1() {
        let record = build_feature_record(&LahanAttributes::default(), demo_window()).unwrap();
        assert_eq!(record.ndvi_lag1, 0.75);
        assert_eq!(record.prod_lag1, 2.2);
        assert!((record.ndvi_roll3 - 0.733333).abs() < 1e-6);
        assert!((record.umur_tanaman_tahun - 8.483333).abs() < 1e-6);
    }

    #[test]
    fn stale_incomplete_row_outside_window_is_ignored() {
        let mut history = demo_window();
        history.push(observation(
            month_at(0).checked_sub_months(Months::new(1)).unwrap(),
            (f64::NAN, 130.0, 8.1, 200.0, 26.0, 1.9),
        ));
        assert!(build_feature_record(&LahanAttributes::default(), history).is_ok());
    }

    #[test]
    fn payload_matches_predictor_contract() {
        let attributes = LahanAttributes {
            penanggung_jawab: "Tim C".to_string(),
            jenis_tanah: "Podsolik".to_string(),
            sistem_irigasi: "Irigasi Parit".to_string(),
            lahan_kabupaten: "Pelalawan".to_string(),
        };
        let record = build_feature_record(&attributes, demo_window()).unwrap();
        let payload = serde_json::to_value(PredictRequest::single(record)).unwrap();

        let instance = &payload["instances"][0];
        let mut keys: Vec<&str> = instance
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "NDVI",
                "NDVI_lag1",
                "NDVI_roll3",
                "curah_hujan_mm",
                "jenis_tanah",
                "lahan_kabupaten",
                "penanggung_jawab",
                "prod_lag1",
                "pupuk_kg_per_ha",
                "pupuk_lag1",
                "pupuk_roll3",
                "sistem_irigasi",
                "suhu_rata2_c",
                "umur_tanaman_tahun",
            ]
        );
        assert_eq!(instance["lahan_kabupaten"], "Pelalawan");
        assert_eq!(payload["instances"].as_array().unwrap().len(), 1);
    }
}
