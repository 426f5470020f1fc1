//! Yield prediction pipeline for a single lahan
//!
//! Reads the owned lahan and its most recent observations, builds the
//! feature record and asks the external predictor for the next month's
//! productivity. Nothing is written, so a failed call can simply be retried.

use shared::{FeatureWindow, PredictRequest, PredictionOutcome, WINDOW_SIZE};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::YieldPredictor;
use crate::repository::{HistoryRepository, LahanRepository};

/// Prediction service over injected repositories and predictor
pub struct PredictionService<R, P> {
    repository: R,
    predictor: P,
}

impl<R, P> PredictionService<R, P>
where
    R: LahanRepository + HistoryRepository,
    P: YieldPredictor,
{
    pub fn new(repository: R, predictor: P) -> Self {
        Self {
            repository,
            predictor,
        }
    }

    /// Predict the productivity of a lahan owned by `user_id`
    pub async fn predict_lahan(
        &self,
        user_id: Uuid,
        lahan_id: Uuid,
    ) -> AppResult<PredictionOutcome> {
        let lahan = self
            .repository
            .find_owned(user_id, lahan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lahan".to_string()))?;

        let history = self
            .repository
            .recent_observations(lahan.id, WINDOW_SIZE)
            .await?;
        let window = FeatureWindow::new(history)?;

        let latest = window.latest();
        let last_actual_productivity = latest.produktivitas_ton_per_ha;
        let last_month = latest.bulan;
        let request = PredictRequest::single(window.to_record(&lahan.attributes()));

        let predicted = self.predictor.predict(&request).await?;

        tracing::info!(
            "Predicted {:.3} ton/ha for lahan {} from {} month(s) up to {}",
            predicted,
            lahan.id,
            window.len(),
            last_month
        );

        Ok(PredictionOutcome {
            lahan_id: lahan.id,
            predicted_productivity_ton_per_ha: predicted,
            last_actual_productivity,
            last_month,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::lahan::Lahan;
    use chrono::{NaiveDate, Utc};
    use shared::{HistoricObservation, LahanAttributes};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubRepository {
        lahan: Option<Lahan>,
        history: Vec<HistoricObservation>,
    }

    impl LahanRepository for StubRepository {
        async fn find_owned(&self, user_id: Uuid, lahan_id: Uuid) -> AppResult<Option<Lahan>> {
            Ok(self
                .lahan
                .clone()
                .filter(|l| l.id == lahan_id && l.user_id == user_id))
        }
    }

    impl HistoryRepository for StubRepository {
        async fn recent_observations(
            &self,
            _lahan_id: Uuid,
            limit: usize,
        ) -> AppResult<Vec<HistoricObservation>> {
            Ok(self.history.iter().take(limit).cloned().collect())
        }
    }

    #[derive(Default)]
    struct StubPredictor {
        answer: Option<f64>,
        calls: AtomicUsize,
        last_request: Mutex<Option<PredictRequest>>,
    }

    impl YieldPredictor for StubPredictor {
        async fn predict(&self, request: &PredictRequest) -> AppResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.answer
                .ok_or_else(|| AppError::PredictorUnreachable("connection refused".to_string()))
        }
    }

    fn lahan(user_id: Uuid) -> Lahan {
        Lahan {
            id: Uuid::new_v4(),
            user_id,
            nama_lahan: "Blok A1".to_string(),
            penanggung_jawab: "Tim B".to_string(),
            jenis_tanah: "Gambut".to_string(),
            sistem_irigasi: "Irigasi Tetes".to_string(),
            lahan_kabupaten: "Siak".to_string(),
            lat: Some(0.5),
            lon: Some(101.4),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn obs(month: u32, ndvi: f64, pupuk: f64, umur: f64, prod: f64) -> HistoricObservation {
        HistoricObservation {
            bulan: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            ndvi,
            pupuk_kg_per_ha: pupuk,
            umur_tanaman_tahun: umur,
            curah_hujan_mm: 200.0,
            suhu_rata2_c: 26.5,
            produktivitas_ton_per_ha: prod,
        }
    }

    #[tokio::test]
    async fn test_predict_lahan_happy_path() {
        let user_id = Uuid::new_v4();
        let plot = lahan(user_id);
        let lahan_id = plot.id;
        let repository = StubRepository {
            lahan: Some(plot),
            history: vec![
                obs(3, 0.75, 150.0, 8.4, 2.2),
                obs(1, 0.72, 135.0, 8.2, 2.0),
                obs(2, 0.73, 140.0, 8.3, 2.1),
            ],
        };
        let predictor = StubPredictor {
            answer: Some(2.35),
            ..Default::default()
        };
        let service = PredictionService::new(repository, predictor);

        let outcome = service.predict_lahan(user_id, lahan_id).await.unwrap();
        assert_eq!(outcome.lahan_id, lahan_id);
        assert_eq!(outcome.predicted_productivity_ton_per_ha, 2.35);
        assert_eq!(outcome.last_actual_productivity, 2.2);
        assert_eq!(outcome.last_month, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let request = service.predictor.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.instances.len(), 1);
        let record = &request.instances[0];
        assert_eq!(record.ndvi_lag1, 0.75);
        assert_eq!(record.pupuk_lag1, 150.0);
        assert_eq!(
            record.attributes,
            LahanAttributes {
                penanggung_jawab: "Tim B".to_string(),
                jenis_tanah: "Gambut".to_string(),
                sistem_irigasi: "Irigasi Tetes".to_string(),
                lahan_kabupaten: "Siak".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_empty_history_never_calls_predictor() {
        let user_id = Uuid::new_v4();
        let plot = lahan(user_id);
        let lahan_id = plot.id;
        let service = PredictionService::new(
            StubRepository {
                lahan: Some(plot),
                history: vec![],
            },
            StubPredictor {
                answer: Some(2.35),
                ..Default::default()
            },
        );

        let err = service.predict_lahan(user_id, lahan_id).await.unwrap_err();
        assert!(matches!(err, AppError::NoHistoricalData));
        assert_eq!(service.predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_foreign_lahan_is_not_found() {
        let plot = lahan(Uuid::new_v4());
        let lahan_id = plot.id;
        let service = PredictionService::new(
            StubRepository {
                lahan: Some(plot),
                history: vec![obs(1, 0.72, 135.0, 8.2, 2.0)],
            },
            StubPredictor::default(),
        );

        let err = service
            .predict_lahan(Uuid::new_v4(), lahan_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(service.predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_predictor_failure_propagates() {
        let user_id = Uuid::new_v4();
        let plot = lahan(user_id);
        let lahan_id = plot.id;
        let service = PredictionService::new(
            StubRepository {
                lahan: Some(plot),
                history: vec![obs(1, 0.72, 135.0, 8.2, 2.0)],
            },
            StubPredictor::default(),
        );

        let err = service.predict_lahan(user_id, lahan_id).await.unwrap_err();
        assert!(matches!(err, AppError::PredictorUnreachable(_)));
        assert_eq!(service.predictor.calls.load(Ordering::SeqCst), 1);
    }
}
