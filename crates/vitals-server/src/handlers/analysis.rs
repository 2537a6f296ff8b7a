//! Analysis handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{AppError, AppState};
use vitals_core::{
    compute_histogram, compute_quartiles, compute_statistics, AggregateMetrics, Analysis,
    FilterRequest, Histogram, Insight, QuartileReport,
};

/// GET /api/metrics - Aggregate metrics for the filter
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterRequest>,
) -> Result<Json<AggregateMetrics>, AppError> {
    let criteria = state.criteria(&params).await?;
    let session = state.session.read().await;
    let ws = session.working_set(&criteria);

    Ok(Json(compute_statistics(&ws, criteria.attribute, &criteria)))
}

/// GET /api/histogram - Distribution bins split by source
pub async fn get_histogram(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterRequest>,
) -> Result<Json<Histogram>, AppError> {
    let criteria = state.criteria(&params).await?;
    let session = state.session.read().await;

    Ok(Json(compute_histogram(&session.working_set(&criteria))))
}

/// GET /api/quartiles - Box-plot summaries per source
pub async fn get_quartiles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterRequest>,
) -> Result<Json<QuartileReport>, AppError> {
    let criteria = state.criteria(&params).await?;
    let session = state.session.read().await;
    let ws = session.working_set(&criteria);

    Ok(Json(compute_quartiles(&ws, criteria.source_filter)))
}

/// GET /api/insights - Generated insights, in rule order
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterRequest>,
) -> Result<Json<Vec<Insight>>, AppError> {
    let criteria = state.criteria(&params).await?;
    let session = state.session.read().await;

    Ok(Json(session.insights(&criteria)))
}

/// GET /api/analysis - Everything for one filter selection
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterRequest>,
) -> Result<Json<Analysis>, AppError> {
    let criteria = state.criteria(&params).await?;
    let session = state.session.read().await;

    Ok(Json(session.analyze(&criteria)))
}
