use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use efficiency_core::{
    domain::{AllBuildingsSummary, BuildingCalculations, CalculationRequest},
    engine::{DEFAULT_LIMIT, DEFAULT_PAGE},
    BuildingEfficiencySummary, EfficiencyCalculation,
};
use time::OffsetDateTime;

use super::{
    schemas::{BuildingsQuery, HealthResponse},
    AppState,
};
use crate::error::{ApiError, Result};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// `POST /efficiency/calculate`
pub async fn calculate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EfficiencyCalculation>)> {
    let Json(req) = payload.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let calc = state.service.calculate(&req).await?;
    Ok((StatusCode::CREATED, Json(calc)))
}

/// `GET /efficiency/buildings`
pub async fn list_buildings(
    State(state): State<AppState>,
    query: std::result::Result<Query<BuildingsQuery>, QueryRejection>,
) -> Result<Json<AllBuildingsSummary>> {
    let Query(q) = query.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let page = q.page.unwrap_or(DEFAULT_PAGE);
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
    let listing = state
        .service
        .list_buildings(page, limit, q.search.as_deref())
        .await?;
    Ok(Json(listing))
}

/// `GET /efficiency/building/:building_id`
pub async fn building_calculations(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
) -> Result<Json<BuildingCalculations>> {
    Ok(Json(state.service.building_calculations(&building_id).await?))
}

/// `GET /efficiency/building/:building_id/period/:period`
pub async fn building_calculations_by_period(
    State(state): State<AppState>,
    Path((building_id, period)): Path<(String, String)>,
) -> Result<Json<BuildingCalculations>> {
    Ok(Json(
        state
            .service
            .building_calculations_by_period(&building_id, &period)
            .await?,
    ))
}

/// `GET /efficiency/building/:building_id/summary`
pub async fn building_summary(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
) -> Result<Json<BuildingEfficiencySummary>> {
    Ok(Json(state.service.building_summary(&building_id).await?))
}

/// `GET /efficiency/building/:building_id/latest`
pub async fn latest_calculation(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
) -> Result<Json<EfficiencyCalculation>> {
    Ok(Json(state.service.latest_calculation(&building_id).await?))
}

/// `GET /efficiency/calculation/:id`
pub async fn calculation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EfficiencyCalculation>> {
    Ok(Json(state.service.calculation(&id).await?))
}
