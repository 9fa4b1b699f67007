use crate::api::{ApiResponse, AppError, AppState, StatusBody};
use crate::event::model::{RunStartDetails, SpecFinished};
use crate::reporter::{Reporter, SpecReport};
use crate::testrail::service::TestManagement;
use axum::extract::State;
use axum::Json;

pub async fn before_run<C: TestManagement>(
    State(app_state): State<AppState<C>>,
    Json(details): Json<RunStartDetails>,
) -> Result<ApiResponse<StatusBody>, AppError> {
    let mut reporter = app_state.reporter.lock().await;
    reporter.on_run_start(&details).await;
    Ok(ApiResponse(status_of(&reporter)))
}

pub async fn after_spec<C: TestManagement>(
    State(app_state): State<AppState<C>>,
    Json(finished): Json<SpecFinished>,
) -> Result<ApiResponse<SpecReport>, AppError> {
    let mut reporter = app_state.reporter.lock().await;
    let report = reporter
        .on_spec_finish(&finished.spec, &finished.results)
        .await?;
    Ok(ApiResponse(report))
}

pub async fn after_run<C: TestManagement>(
    State(app_state): State<AppState<C>>,
) -> Result<ApiResponse<StatusBody>, AppError> {
    let mut reporter = app_state.reporter.lock().await;
    reporter.on_run_finish().await?;
    Ok(ApiResponse(status_of(&reporter)))
}

pub async fn status<C: TestManagement>(
    State(app_state): State<AppState<C>>,
) -> ApiResponse<StatusBody> {
    let reporter = app_state.reporter.lock().await;
    ApiResponse(status_of(&reporter))
}

fn status_of<C: TestManagement>(reporter: &Reporter<C>) -> StatusBody {
    let state = reporter.lifecycle().state();
    StatusBody {
        enabled: true,
        mode: Some(format!("{:?}", state.mode)),
        run_id: state.run_id,
        phase: Some(format!("{:?}", state.phase)),
    }
}
