//! Vitals Web Server
//!
//! Axum-based JSON API over a loaded vitals session.
//!
//! - One shared session behind a read/write lock; reads run the analysis
//!   pipeline, `POST /api/reload` swaps the series wholesale
//! - Restrictive CORS policy and security headers
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDateTime};
use tokio::sync::RwLock;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info};

use vitals_core::session::load_synthetic;
use vitals_core::{
    Attribute, DataSources, FilterCriteria, FilterRequest, InsightThresholds, Session,
};

pub mod handlers;

#[cfg(test)]
mod tests;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerOptions {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Directory of static dashboard assets to serve at `/`
    pub static_dir: Option<String>,
}

/// Shared application state
pub struct AppState {
    pub session: RwLock<Session>,
    /// CSV sources to reload from; `None` always reloads synthetic data
    pub sources: Option<DataSources>,
    /// Attribute used when a request does not name one
    pub default_attribute: Attribute,
    pub thresholds: InsightThresholds,
}

impl AppState {
    pub fn new(
        session: Session,
        sources: Option<DataSources>,
        default_attribute: Attribute,
    ) -> Self {
        let thresholds = *session.thresholds();
        Self {
            session: RwLock::new(session),
            sources,
            default_attribute,
            thresholds,
        }
    }

    /// Resolve a request's filter against the current session
    pub async fn criteria(&self, request: &FilterRequest) -> Result<FilterCriteria, AppError> {
        let session = self.session.read().await;
        Ok(session.resolve_criteria(request, self.default_attribute)?)
    }

    /// Build a fresh session from the sources and replace the current one
    pub async fn reload(&self, now: NaiveDateTime) {
        let fresh = match &self.sources {
            Some(sources) => Session::load(sources, now).await,
            None => Session::from_report(load_synthetic(now), now),
        }
        .with_thresholds(self.thresholds);

        info!(
            origin = fresh.origin.as_str(),
            records = fresh.series.len(),
            "Session reloaded"
        );
        *self.session.write().await = fresh;
    }
}

pub fn create_router(state: Arc<AppState>, options: ServerOptions) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/attributes", get(handlers::list_attributes))
        .route("/series", get(handlers::get_series))
        .route("/metrics", get(handlers::get_metrics))
        .route("/histogram", get(handlers::get_histogram))
        .route("/quartiles", get(handlers::get_quartiles))
        .route("/insights", get(handlers::get_insights))
        .route("/analysis", get(handlers::get_analysis))
        .route("/reload", post(handlers::reload))
        .fallback(handlers::api_not_found);

    // Build CORS layer
    let cors = if options.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = options
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = options.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    state: Arc<AppState>,
    host: &str,
    port: u16,
    options: ServerOptions,
) -> anyhow::Result<()> {
    {
        let session = state.session.read().await;
        info!(
            origin = session.origin.as_str(),
            records = session.series.len(),
            "Serving session"
        );
    }

    let app = create_router(state, options);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Local wall-clock time used for reloads
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

/// Invalid input is the caller's fault; anything else is logged and hidden
impl From<vitals_core::Error> for AppError {
    fn from(err: vitals_core::Error) -> Self {
        match err {
            vitals_core::Error::InvalidData(_) => Self::bad_request(&err.to_string()),
            other => {
                error!(error = %other, "Internal error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "An internal error occurred".to_string(),
                }
            }
        }
    }
}
