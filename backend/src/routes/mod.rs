//! Route definitions for the Saw-it API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - lahan management and prediction
        .nest("/lahan", lahan_routes(state.clone()))
        // Protected routes - estimates
        .nest("/estimasi", estimate_routes(state.clone()))
        // Protected routes - dashboard
        .nest("/dashboard", dashboard_routes(state))
}

/// Lahan routes (protected)
fn lahan_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lahan).post(handlers::create_lahan))
        .route("/dummy", post(handlers::seed_demo_lahan))
        .route(
            "/:lahan_id",
            get(handlers::get_lahan).put(handlers::update_lahan),
        )
        .route(
            "/:lahan_id/historis",
            get(handlers::list_observations).post(handlers::record_observation),
        )
        .route("/:lahan_id/predict", get(handlers::predict_lahan))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Estimate routes (protected)
fn estimate_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::record_prediction))
        .route("/dummy", post(handlers::record_prediction))
        .route("/summary", get(handlers::get_estimate_summary))
        .route("/history", get(handlers::get_estimate_history))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_ndvi_summary))
        .route("/tren", get(handlers::get_production_trend))
        .route("/lahan", get(handlers::get_plot_overview))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
