//! Lahan management and prediction HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::repository::PgRepository;
use crate::services::lahan::{
    CreateLahanInput, RecordObservationInput, SeedLahanInput, UpdateLahanInput,
};
use crate::services::{LahanService, PredictionService};
use crate::AppState;

fn lahan_service(state: &AppState) -> LahanService {
    LahanService::new(state.db.clone(), state.config.lahan_defaults.clone())
}

/// List all lahan of the current user
pub async fn list_lahan(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    match lahan_service(&state).list_lahan(current_user.0.user_id).await {
        Ok(lahan) => (StatusCode::OK, Json(serde_json::json!({ "lahan": lahan }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific lahan
pub async fn get_lahan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lahan_id): Path<Uuid>,
) -> impl IntoResponse {
    match lahan_service(&state).get_lahan(current_user.0.user_id, lahan_id).await {
        Ok(lahan) => (StatusCode::OK, Json(lahan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new lahan
pub async fn create_lahan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateLahanInput>,
) -> impl IntoResponse {
    match lahan_service(&state).create_lahan(current_user.0.user_id, input).await {
        Ok(lahan) => (StatusCode::CREATED, Json(lahan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a lahan
pub async fn update_lahan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lahan_id): Path<Uuid>,
    Json(input): Json<UpdateLahanInput>,
) -> impl IntoResponse {
    match lahan_service(&state)
        .update_lahan(current_user.0.user_id, lahan_id, input)
        .await
    {
        Ok(lahan) => (StatusCode::OK, Json(lahan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a monthly observation for a lahan
pub async fn record_observation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lahan_id): Path<Uuid>,
    Json(input): Json<RecordObservationInput>,
) -> impl IntoResponse {
    match lahan_service(&state)
        .record_observation(current_user.0.user_id, lahan_id, input)
        .await
    {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the observations of a lahan
pub async fn list_observations(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lahan_id): Path<Uuid>,
) -> impl IntoResponse {
    match lahan_service(&state)
        .list_observations(current_user.0.user_id, lahan_id)
        .await
    {
        Ok(rows) => {
            (StatusCode::OK, Json(serde_json::json!({ "data_historis": rows }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Seed a demo lahan with history (development only)
pub async fn seed_demo_lahan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SeedLahanInput>,
) -> impl IntoResponse {
    let development = state.config.is_development();

    match lahan_service(&state)
        .seed_demo_lahan(current_user.0.user_id, input, development)
        .await
    {
        Ok(seeded) => (StatusCode::CREATED, Json(seeded)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Predict next month's productivity of a lahan
pub async fn predict_lahan(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lahan_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = PredictionService::new(
        PgRepository::new(state.db.clone()),
        state.predictor.clone(),
    );

    match service.predict_lahan(current_user.0.user_id, lahan_id).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}
