//! Estimate HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::middleware::CurrentUser;
use crate::services::estimate::{EstimateHistoryFilter, RecordPredictionInput};
use crate::services::EstimateService;
use crate::AppState;

/// Store a prediction record
pub async fn record_prediction(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordPredictionInput>,
) -> impl IntoResponse {
    let service = EstimateService::new(state.db.clone());

    match service.record_prediction(current_user.0.user_id, input).await {
        Ok(prediksi) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "prediksi": prediksi })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Summary of the latest estimate of every lahan
pub async fn get_estimate_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = EstimateService::new(state.db.clone());

    match service.estimate_summary(current_user.0.user_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Estimate history, filtered by `tahun`, `bulan` and `blok`
pub async fn get_estimate_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<EstimateHistoryFilter>,
) -> impl IntoResponse {
    let service = EstimateService::new(state.db.clone());

    match service.estimate_history(current_user.0.user_id, filter).await {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(e) => e.into_response(),
    }
}
