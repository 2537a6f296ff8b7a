//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, NaiveDateTime};
use http_body_util::BodyExt;
use std::io::Write;
use tower::ServiceExt;
use vitals_core::{DataOrigin, Record, Series, Source};

fn loaded_at() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-10 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Historical stress [40,50,60] on Jan 1-3, predicted [70,80,90] on Jan 4-6
fn test_session() -> Session {
    let base = NaiveDateTime::parse_from_str("2024-01-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let reading = |day: i64, source: Source, stress: f64| {
        Record::new(base + Duration::days(day), source)
            .with_value(Attribute::StressIndex, stress)
            .with_value(Attribute::HeartRate, 70.0 + day as f64)
    };

    let series = Series::merge(
        vec![
            reading(0, Source::Historical, 40.0),
            reading(1, Source::Historical, 50.0),
            reading(2, Source::Historical, 60.0),
        ],
        vec![
            reading(3, Source::Predicted, 70.0),
            reading(4, Source::Predicted, 80.0),
            reading(5, Source::Predicted, 90.0),
        ],
    );
    Session::from_series(series, DataOrigin::Files, loaded_at())
}

fn test_state(sources: Option<DataSources>) -> Arc<AppState> {
    Arc::new(AppState::new(
        test_session(),
        sources,
        Attribute::StressIndex,
    ))
}

fn setup_test_app() -> Router {
    create_router(test_state(None), ServerOptions::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

// ========== Session API Tests ==========

#[tokio::test]
async fn test_health() {
    let response = get(setup_test_app(), "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["origin"], "files");
    assert_eq!(json["records"], 6);
    assert_eq!(json["historical"], 3);
    assert_eq!(json["predicted"], 3);
}

#[tokio::test]
async fn test_list_attributes() {
    let response = get(setup_test_app(), "/api/attributes").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let attributes = json.as_array().unwrap();
    assert_eq!(attributes.len(), 4);
    assert_eq!(attributes[0]["key"], "stress_index");
    assert_eq!(attributes[0]["column"], "StressIndex");
    assert_eq!(attributes[0]["available"], true);
    assert_eq!(attributes[2]["key"], "systolic_bp");
    assert_eq!(attributes[2]["available"], false);
}

#[tokio::test]
async fn test_security_headers() {
    let response = get(setup_test_app(), "/api/health").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let response = get(setup_test_app(), "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert!(json["error"].is_string());
}

// ========== Analysis API Tests ==========

#[tokio::test]
async fn test_series_with_filters() {
    let response = get(
        setup_test_app(),
        "/api/series?attribute=heart_rate&from=2024-01-02&to=2024-01-04&source=historical",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["value"], 71.0);
    assert_eq!(points[0]["source"], "historical");
    assert_eq!(json["criteria"]["attribute"], "heart_rate");
}

#[tokio::test]
async fn test_metrics_defaults_to_full_range() {
    let response = get(setup_test_app(), "/api/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["attribute"], "stress_index");
    assert_eq!(json["average"], 65.0);
    assert_eq!(json["total_records"], 6);
    assert_eq!(json["date_span_days"], 6);
    assert!((json["change_percent"].as_f64().unwrap() - 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_metrics_empty_window() {
    let response = get(setup_test_app(), "/api/metrics?from=2025-01-01&to=2025-01-02").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_records"], 0);
    assert!(json["average"].is_null());
    assert!(json["change_percent"].is_null());
}

#[tokio::test]
async fn test_histogram() {
    let response = get(setup_test_app(), "/api/histogram").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let bins = json["bins"].as_array().unwrap();
    assert_eq!(bins.len(), 3);
    let total: u64 = bins.iter().map(|b| b["total"].as_u64().unwrap()).sum();
    assert_eq!(total, 6);
}

#[tokio::test]
async fn test_quartiles() {
    let response = get(setup_test_app(), "/api/quartiles?source=predicted").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["historical"].is_null());
    assert_eq!(json["predicted"]["median"], 80.0);
    assert_eq!(json["predicted"]["count"], 3);
}

#[tokio::test]
async fn test_insights_order() {
    let response = get(setup_test_app(), "/api/insights").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let insights = json.as_array().unwrap();
    assert_eq!(insights[0]["rule"], "comparison");
    assert_eq!(insights[0]["kind"], "warning");
    assert!(insights[0]["message"]
        .as_str()
        .unwrap()
        .contains("increase by 60.0%"));
    assert_eq!(insights[1]["rule"], "trend");
}

#[tokio::test]
async fn test_analysis_bundle() {
    let response = get(setup_test_app(), "/api/analysis?source=both").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["criteria"]["source_filter"], "both");
    assert_eq!(json["metrics"]["historical_records"], 3);
    assert_eq!(json["summary"].as_array().unwrap().len(), 2);
    assert!(!json["insights"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_filters_rejected() {
    for uri in [
        "/api/metrics?attribute=glucose",
        "/api/histogram?from=01-02-2024",
        "/api/insights?source=forecast",
        "/api/analysis?from=2024-01-05&to=2024-01-01",
    ] {
        let response = get(setup_test_app(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

        let json = get_body_json(response).await;
        assert!(json["error"].is_string(), "{uri}");
    }
}

// ========== Reload Tests ==========

#[tokio::test]
async fn test_reload_from_files() {
    let mut historical = tempfile::NamedTempFile::new().unwrap();
    write!(historical, "datetime,StressIndex\n2024-02-01 00:00:00,42\n").unwrap();
    let mut predicted = tempfile::NamedTempFile::new().unwrap();
    write!(predicted, "datetime,StressIndex\n2024-02-02 00:00:00,48\n").unwrap();

    let state = test_state(Some(DataSources {
        historical: historical.path().to_path_buf(),
        predicted: predicted.path().to_path_buf(),
    }));
    let app = create_router(state.clone(), ServerOptions::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reload")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["origin"], "files");
    assert_eq!(json["records"], 2);
    assert_eq!(state.session.read().await.series.len(), 2);
}

#[tokio::test]
async fn test_reload_without_sources_uses_synthetic() {
    let state = test_state(None);
    state.reload(loaded_at()).await;

    let session = state.session.read().await;
    assert_eq!(session.origin, DataOrigin::Synthetic);
    assert_eq!(session.series.len(), 270 * 24);
}

// ========== Error Mapping Tests ==========

#[tokio::test]
async fn test_invalid_data_maps_to_bad_request() {
    let err = vitals_core::Error::InvalidData("Unknown attribute: glucose".to_string());
    let response = AppError::from(err).into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("glucose"));
}

#[tokio::test]
async fn test_internal_errors_are_hidden() {
    let err = vitals_core::Error::SourceUnavailable("/srv/secret/history.csv".to_string());
    let response = AppError::from(err).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
}
