//! Dashboard HTTP handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::PlotOverview;
use crate::services::DashboardService;
use crate::AppState;
use shared::{NdviSummary, TrendPoint};

/// NDVI health counts
pub async fn get_ndvi_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<NdviSummary>> {
    let service = DashboardService::new(state.db.clone());
    let summary = service.ndvi_summary(current_user.0.user_id).await?;
    Ok(Json(summary))
}

/// Monthly production trend over the last year
pub async fn get_production_trend(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<TrendPoint>>> {
    let service = DashboardService::new(state.db.clone());
    let trend = service.production_trend(current_user.0.user_id).await?;
    Ok(Json(trend))
}

/// Lahan list with latest prediction for the dashboard map
pub async fn get_plot_overview(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PlotOverview>>> {
    let service = DashboardService::new(state.db.clone());
    let overview = service.plot_overview(current_user.0.user_id).await?;
    Ok(Json(overview))
}
