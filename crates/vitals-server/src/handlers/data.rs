//! Session and series handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{now, AppError, AppState};
use vitals_core::{
    Attribute, AttributeMetadata, DataOrigin, FilterCriteria, FilterRequest, SeriesPoint,
    Session,
};

/// Health and load status of the current session
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub origin: DataOrigin,
    pub records: usize,
    pub historical: usize,
    pub predicted: usize,
    pub skipped_rows: usize,
    pub loaded_at: NaiveDateTime,
}

impl HealthResponse {
    fn from_session(session: &Session) -> Self {
        let counts = session.series.count_by_source();
        Self {
            status: "ok",
            origin: session.origin,
            records: session.series.len(),
            historical: counts.historical,
            predicted: counts.predicted,
            skipped_rows: session.row_errors.len(),
            loaded_at: session.loaded_at,
        }
    }
}

/// Attribute metadata plus whether the series has readings for it
#[derive(Debug, Serialize)]
pub struct AttributeInfo {
    #[serde(flatten)]
    pub metadata: AttributeMetadata,
    pub available: bool,
}

/// Working-set points for the time-series chart
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub criteria: FilterCriteria,
    pub points: Vec<SeriesPoint>,
}

/// GET /api/health - Session status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let session = state.session.read().await;
    Json(HealthResponse::from_session(&session))
}

/// GET /api/attributes - Attribute metadata
pub async fn list_attributes(State(state): State<Arc<AppState>>) -> Json<Vec<AttributeInfo>> {
    let session = state.session.read().await;
    let available = session.series.available_attributes();

    let attributes = Attribute::ALL
        .into_iter()
        .map(|attribute| AttributeInfo {
            metadata: attribute.metadata(),
            available: available.contains(&attribute),
        })
        .collect();

    Json(attributes)
}

/// GET /api/series - Filtered points for the selected attribute
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterRequest>,
) -> Result<Json<SeriesResponse>, AppError> {
    let criteria = state.criteria(&params).await?;
    let session = state.session.read().await;
    let points = session.working_set(&criteria).points();

    Ok(Json(SeriesResponse { criteria, points }))
}

/// POST /api/reload - Reload sources and replace the session
pub async fn reload(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    state.reload(now()).await;
    let session = state.session.read().await;
    Json(HealthResponse::from_session(&session))
}
