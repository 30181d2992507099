//! Crew run endpoints
//!
//! POST /api/runs - Run the crew for a goal
//! GET /api/runs/:id - Fetch a stored run
//! GET /api/runs/:id/download - Download the raw result as a text file

use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use crew_core::{format_error_for_chat, validate_goal, CrewOutput, Error, ResearchCrewBuilder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::store::{RunRecord, RunStore};
use crate::web::render_markdown;

/// Shared state for run handlers
pub struct AppState {
    pub builder: ResearchCrewBuilder,
    pub runs: RunStore,
    pub download_filename: String,
}

/// Request body for starting a run
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub goal: String,
}

/// Per-task summary returned alongside the result
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    pub agent_role: String,
    pub description: String,
    pub output_chars: usize,
    pub tool_calls: usize,
    pub iterations: usize,
}

/// A completed run
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    pub status: &'static str,
    pub message: &'static str,
    pub goal: String,
    pub result: String,
    pub html: String,
    pub tasks: Vec<TaskSummary>,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
    pub download_url: String,
}

impl RunResponse {
    fn from_record(record: &RunRecord) -> Self {
        Self {
            run_id: record.id,
            status: "completed",
            message: "Complete!",
            goal: record.goal.clone(),
            result: record.result.clone(),
            html: render_markdown(&record.result),
            tasks: record.tasks.clone(),
            duration_ms: record.duration_ms,
            created_at: record.created_at,
            download_url: format!("/api/runs/{}/download", record.id),
        }
    }
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

fn summarize(output: &CrewOutput) -> Vec<TaskSummary> {
    output
        .tasks_output
        .iter()
        .map(|t| TaskSummary {
            id: t.task_id.to_string(),
            name: t.name.clone(),
            agent_role: t.agent_role.clone(),
            description: t.description.clone(),
            output_chars: t.raw.chars().count(),
            tool_calls: t.tool_calls.len(),
            iterations: t.iterations,
        })
        .collect()
}

fn error_response(error: &Error) -> Response {
    let (status, kind) = match error {
        Error::EmptyGoal => (StatusCode::UNPROCESSABLE_ENTITY, "warning"),
        e if e.is_model_failure() => (StatusCode::BAD_GATEWAY, "error"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    };
    let message = match error {
        Error::EmptyGoal => "Enter a goal".to_string(),
        e => format_error_for_chat(e),
    };
    (
        status,
        Json(ErrorResponse {
            status: kind,
            message,
        }),
    )
        .into_response()
}

/// Run the crew for a goal
async fn create_run(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<RunRequest>,
) -> Response {
    let goal = match validate_goal(&request.goal) {
        Ok(goal) => goal.to_string(),
        Err(e) => {
            warn!("Rejected run with empty goal");
            return error_response(&e);
        }
    };

    info!(goal = %goal, "Crew run requested");
    let output = match state.builder.run(&goal).await {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "Crew run failed");
            return error_response(&e);
        }
    };

    let record = RunRecord {
        id: Uuid::new_v4(),
        goal,
        tasks: summarize(&output),
        duration_ms: output.duration_ms,
        result: output.raw,
        created_at: Utc::now(),
    };
    let response = RunResponse::from_record(&record);
    let stored = state.runs.insert(record).await;
    info!(
        run_id = %response.run_id,
        duration_ms = response.duration_ms,
        stored,
        "Crew run completed"
    );

    Json(response).into_response()
}

async fn find_run(state: &AppState, id: &str) -> Option<RunRecord> {
    let id = Uuid::parse_str(id).ok()?;
    state.runs.get(id).await
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            status: "error",
            message: "Run not found".to_string(),
        }),
    )
        .into_response()
}

/// Fetch a stored run
async fn get_run(Extension(state): Extension<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match find_run(&state, &id).await {
        Some(record) => Json(RunResponse::from_record(&record)).into_response(),
        None => not_found(),
    }
}

/// Download the raw result
async fn download_run(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(record) = find_run(&state, &id).await else {
        return not_found();
    };

    let disposition = format!("attachment; filename=\"{}\"", state.download_filename);
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        record.result,
    )
        .into_response()
}

/// Run routes
pub fn runs_routes() -> Router {
    Router::new()
        .route("/api/runs", post(create_run))
        .route("/api/runs/:id", get(get_run))
        .route("/api/runs/:id/download", get(download_run))
}
