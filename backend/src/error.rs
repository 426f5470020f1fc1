//! Error handling for the Saw-it backend
//!
//! Provides consistent error responses in English and Indonesian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::FeatureError;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_id: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Prediction pipeline errors
    #[error("No historical data for this lahan")]
    NoHistoricalData,

    #[error("Incomplete observation {month}: missing {field}")]
    IncompleteObservation { month: String, field: String },

    #[error("Predictor unreachable: {0}")]
    PredictorUnreachable(String),

    #[error("Invalid predictor response: {0}")]
    PredictorResponseInvalid(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<FeatureError> for AppError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::NoHistoricalData => AppError::NoHistoricalData,
            FeatureError::IncompleteObservation { month, field } => {
                AppError::IncompleteObservation {
                    month: month.to_string(),
                    field: field.to_string(),
                }
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("input".to_string(), "Invalid input".to_string()));

        AppError::Validation {
            message_id: format!("Data tidak valid: {}", field),
            field,
            message,
        }
    }
}

impl AppError {
    /// Build a validation error for a single field
    pub fn validation(field: &str, message: &str, message_id: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_id: message_id.to_string(),
        }
    }
}

/// Run derive-based validation on an input struct
pub fn validate_input<T: Validate>(input: &T) -> AppResult<()> {
    input.validate().map_err(AppError::from)
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message_en: msg.clone(),
                    message_id: "Tidak memiliki otorisasi".to_string(),
                    field: None,
                },
            ),
            AppError::Validation { field, message, message_id } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_id: message_id.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_id: format!("{} tidak ditemukan", resource),
                    field: None,
                },
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "FORBIDDEN".to_string(),
                    message_en: msg.clone(),
                    message_id: "Akses ditolak".to_string(),
                    field: None,
                },
            ),
            AppError::NoHistoricalData => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "NO_HISTORICAL_DATA".to_string(),
                    message_en: "No historical data found for this lahan".to_string(),
                    message_id: "Data historis tidak ditemukan untuk lahan ini.".to_string(),
                    field: None,
                },
            ),
            AppError::IncompleteObservation { month, field } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INCOMPLETE_OBSERVATION".to_string(),
                    message_en: format!("Observation for {} is missing {}", month, field),
                    message_id: format!("Data historis {} tidak lengkap: {}", month, field),
                    field: Some(field.clone()),
                },
            ),
            AppError::PredictorUnreachable(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "PREDICTOR_UNREACHABLE".to_string(),
                    message_en: "Yield prediction service is unavailable".to_string(),
                    message_id: "Gagal mendapatkan prediksi.".to_string(),
                    field: None,
                },
            ),
            AppError::PredictorResponseInvalid(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "PREDICTOR_RESPONSE_INVALID".to_string(),
                    message_en: "Yield prediction service returned an invalid response"
                        .to_string(),
                    message_id: "Respons layanan prediksi tidak valid.".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_id: "Terjadi kesalahan pada basis data".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_id: "Terjadi kesalahan pada server".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_feature_errors_map_to_pipeline_variants() {
        assert!(matches!(
            AppError::from(FeatureError::NoHistoricalData),
            AppError::NoHistoricalData
        ));

        let err = AppError::from(FeatureError::IncompleteObservation {
            month: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            field: "NDVI",
        });
        match err {
            AppError::IncompleteObservation { month, field } => {
                assert_eq!(month, "2024-02-01");
                assert_eq!(field, "NDVI");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NoHistoricalData.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::IncompleteObservation {
                month: "2024-02-01".to_string(),
                field: "NDVI".to_string(),
            }
            .into_response()
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::PredictorUnreachable("timeout".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::PredictorResponseInvalid("empty".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::NotFound("Lahan".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
