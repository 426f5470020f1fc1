//! Yield predictor client
//!
//! Client for the Python model service that serves the palm productivity
//! XGBoost model behind `POST /predict`.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use shared::{PredictRequest, PredictResponse};

use crate::config::PredictorConfig;
use crate::error::{AppError, AppResult};

/// Anything that can turn a predict request into a single yield figure.
///
/// Implemented by [`PredictorClient`] for the real service; tests supply
/// their own implementations.
pub trait YieldPredictor: Send + Sync {
    /// Predicted productivity (ton/ha) for the single instance in `request`
    fn predict(&self, request: &PredictRequest) -> impl Future<Output = AppResult<f64>> + Send;
}

/// HTTP client for the yield predictor service
#[derive(Clone)]
pub struct PredictorClient {
    endpoint: String,
    http_client: Client,
}

impl PredictorClient {
    /// Create a new predictor client with a request timeout
    pub fn new(endpoint: String, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Create a client from the `predictor` configuration section
    pub fn from_config(config: &PredictorConfig) -> AppResult<Self> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl YieldPredictor for PredictorClient {
    async fn predict(&self, request: &PredictRequest) -> AppResult<f64> {
        tracing::debug!(
            "Sending payload to predictor: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::PredictorUnreachable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::PredictorUnreachable(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::PredictorUnreachable(format!("Failed to read response: {}", e)))?;

        extract_prediction(&body)
    }
}

/// Parse a predictor response body and take the first prediction
pub fn extract_prediction(body: &[u8]) -> AppResult<f64> {
    let parsed: PredictResponse = serde_json::from_slice(body).map_err(|e| {
        AppError::PredictorResponseInvalid(format!("Failed to parse response: {}", e))
    })?;

    if parsed.predictions.len() > 1 {
        tracing::warn!(
            "Predictor returned {} predictions for one instance, using the first",
            parsed.predictions.len()
        );
    }

    parsed
        .first_prediction()
        .ok_or_else(|| AppError::PredictorResponseInvalid("No prediction in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_prediction() {
        let value = extract_prediction(br#"{"predictions":[2.35]}"#).unwrap();
        assert_eq!(value, 2.35);
    }

    #[test]
    fn test_extract_uses_first_of_many() {
        let value = extract_prediction(br#"{"predictions":[1.8, 2.9]}"#).unwrap();
        assert_eq!(value, 1.8);
    }

    #[test]
    fn test_empty_predictions_are_invalid() {
        let err = extract_prediction(br#"{"predictions":[]}"#).unwrap_err();
        assert!(matches!(err, AppError::PredictorResponseInvalid(_)));
    }

    #[test]
    fn test_malformed_bodies_are_invalid() {
        let bodies: [&[u8]; 6] = [
            br#"{}"#,
            br#"{"predictions":"2.35"}"#,
            br#"{"predictions":["abc"]}"#,
            br#"{"detail":"Model is not loaded"}"#,
            b"not json",
            b"",
        ];
        for body in bodies {
            let err = extract_prediction(body).unwrap_err();
            assert!(
                matches!(err, AppError::PredictorResponseInvalid(_)),
                "body {:?} gave {:?}",
                String::from_utf8_lossy(body),
                err
            );
        }
    }

    #[test]
    fn test_client_from_config() {
        let client = PredictorClient::from_config(&PredictorConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/predict");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Port 9 (discard) on localhost is closed on test machines
        let client =
            PredictorClient::new("http://127.0.0.1:9/predict".to_string(), Duration::from_secs(2))
                .unwrap();
        let request = PredictRequest { instances: vec![] };

        let err = client.predict(&request).await.unwrap_err();
        assert!(matches!(err, AppError::PredictorUnreachable(_)));
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out() {
        // Accepts the connection and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let client = PredictorClient::new(
            format!("http://{}/predict", addr),
            Duration::from_millis(200),
        )
        .unwrap();
        let request = PredictRequest { instances: vec![] };

        let started = std::time::Instant::now();
        let err = client.predict(&request).await.unwrap_err();
        assert!(matches!(err, AppError::PredictorUnreachable(_)), "{:?}", err);
        assert!(started.elapsed() < Duration::from_secs(5));

        server.abort();
    }
}
