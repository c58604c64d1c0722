use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::data::{Backend, SchedulingInput, SchedulingOutput};
use crate::error::ScheduleError;
use crate::solver;

type ApiError = (StatusCode, String);

/// Body of a solve request: the scheduling input plus the backend to use.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    #[serde(default)]
    pub backend: Backend,
    #[serde(flatten)]
    pub input: SchedulingInput,
}

/// Outcome of one run inside a compare or batch response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<SchedulingOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<SchedulingOutput, ApiError>> for RunResult {
    fn from(result: Result<SchedulingOutput, ApiError>) -> Self {
        match result {
            Ok(output) => Self {
                output: Some(output),
                error: None,
            },
            Err((_, message)) => Self {
                output: None,
                error: Some(message),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub greedy: RunResult,
    pub exact: RunResult,
}

fn error_response(e: ScheduleError) -> ApiError {
    let status = match e {
        _ if e.is_input_error() => StatusCode::BAD_REQUEST,
        ScheduleError::Infeasible => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("Scheduling run failed: {}", e);
    (status, e.to_string())
}

/// Runs the solver off the async runtime.
async fn run(input: SchedulingInput, backend: Backend) -> Result<SchedulingOutput, ApiError> {
    tokio::task::spawn_blocking(move || solver::solve(&input, backend))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("scheduling task failed: {e}"),
            )
        })?
        .map_err(error_response)
}

async fn solve_handler(
    Json(request): Json<SolveRequest>,
) -> Result<Json<SchedulingOutput>, ApiError> {
    run(request.input, request.backend).await.map(Json)
}

async fn compare_handler(Json(input): Json<SchedulingInput>) -> Json<CompareResponse> {
    let (greedy, exact) = tokio::join!(
        run(input.clone(), Backend::Greedy),
        run(input, Backend::Exact)
    );
    Json(CompareResponse {
        greedy: greedy.into(),
        exact: exact.into(),
    })
}

async fn batch_handler(Json(requests): Json<Vec<SolveRequest>>) -> Json<Vec<RunResult>> {
    info!("Running batch of {} scheduling requests.", requests.len());
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| tokio::spawn(run(request.input, request.backend)))
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("scheduling task failed: {e}"),
            )),
        };
        results.push(result.into());
    }
    Json(results)
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/v1/schedule/compare", post(compare_handler))
        .route("/v1/schedule/batch", post(batch_handler))
}

pub async fn run_server(config: &ServiceConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await
}
