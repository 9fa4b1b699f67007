use crate::config::ReporterMode;
use crate::event::api::{after_run, after_spec, before_run, status};
use crate::reporter::{ReportError, Reporter};
use crate::testrail::service::{TestManagement, TestRailClient};
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

/// The lock serializes runner events: one event is handled at a time.
pub struct AppState<C: TestManagement> {
    pub reporter: Arc<Mutex<Reporter<C>>>,
}

impl<C: TestManagement> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            reporter: Arc::clone(&self.reporter),
        }
    }
}

pub fn build_api(mode: ReporterMode) -> Router {
    let reporter = match mode {
        ReporterMode::Disabled => None,
        ReporterMode::Enabled(config) => {
            let client = TestRailClient::from_config(&config);
            Some(Reporter::from_config(client, &config))
        }
    };
    build_router(reporter)
}

/// Without a reporter only `/status` exists; the event routes are not registered.
pub fn build_router<C: TestManagement>(reporter: Option<Reporter<C>>) -> Router {
    let router = match reporter {
        None => Router::new().route("/status", get(disabled_status)),
        Some(reporter) => {
            let app_state = AppState {
                reporter: Arc::new(Mutex::new(reporter)),
            };
            Router::new()
                .route("/events/before-run", post(before_run::<C>))
                .route("/events/after-spec", post(after_spec::<C>))
                .route("/events/after-run", post(after_run::<C>))
                .route("/status", get(status::<C>))
                .with_state(app_state)
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().include_headers(false))
            .on_request(DefaultOnRequest::new().level(Level::DEBUG))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::DEBUG)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

async fn disabled_status() -> Json<StatusBody> {
    Json(StatusBody {
        enabled: false,
        mode: None,
        run_id: None,
        phase: None,
    })
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub enabled: bool,
    pub mode: Option<String>,
    pub run_id: Option<u64>,
    pub phase: Option<String>,
}

pub struct ApiResponse<T>(pub T);

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_string(&self.0) {
            Ok(json) => (
                StatusCode::OK,
                [("Content-Type", "application/json")],
                json,
            )
                .into_response(),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to serialize response",
            )
                .into_response(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Conflict(String),
}

impl From<ReportError> for AppError {
    fn from(error: ReportError) -> Self {
        AppError::Conflict(error.to_string())
    }
}

#[derive(Deserialize, Serialize, Clone)]
pub struct ErrorBody {
    pub message: String,
}

impl From<ErrorBody> for Body {
    fn from(error: ErrorBody) -> Self {
        Body::from(serde_json::to_string(&error).unwrap_or_default())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Conflict(message) => {
                tracing::warn!("{}", message);
                (
                    StatusCode::CONFLICT,
                    [("Content-Type", "application/json")],
                    Body::from(ErrorBody { message }),
                )
                    .into_response()
            }
        }
    }
}
