//! Task lifecycle API handlers
//!
//! `POST /start-process` creates a task and spawns its pipeline
//! fire-and-forget; `GET /process-status/:task_id` polls the task record.

use crate::error::AppError;
use crate::pipeline::run_pipeline;
use crate::state::{AppState, Task};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request body for starting a narrated-article run
#[derive(Debug, Deserialize)]
pub struct StartProcessRequest {
    /// The topic to research
    pub query: String,
    /// Target language for the generated text
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "french".to_string()
}

/// Response body acknowledging a started run
#[derive(Debug, Serialize)]
pub struct StartProcessResponse {
    /// Human-readable acknowledgement
    pub message: String,
    /// Id to poll on `/process-status/{task_id}`
    pub task_id: String,
}

/// POST /start-process - create a task and begin its pipeline
///
/// Returns immediately; progress is observable only through the status
/// endpoint.
pub async fn start_process(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartProcessRequest>,
) -> Result<Json<StartProcessResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::InvalidRequest("query must not be empty".to_string()));
    }

    let task_id = Uuid::new_v4().to_string();
    state.tasks.create(&task_id, Utc::now()).await?;

    tracing::info!(task_id = %task_id, topic = %request.query, "Task created");
    tokio::spawn(run_pipeline(
        state.clone(),
        task_id.clone(),
        request.query,
        request.lang,
    ));

    Ok(Json(StartProcessResponse {
        message: "Process started".to_string(),
        task_id,
    }))
}

/// GET /process-status/:task_id - poll a task record
///
/// Responds 404 for unknown ids, including tasks removed by eviction.
pub async fn get_process_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, AppError> {
    state
        .tasks
        .get(&task_id)
        .await
        .map(Json)
        .ok_or(AppError::TaskNotFound(task_id))
}
