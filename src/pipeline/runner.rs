//! Pipeline runner
//!
//! Drives the five stages for one task in fixed order, writing a running
//! marker before each stage and its result after, and mapping the first
//! stage error to the terminal `failed` state. Runs fire-and-forget on the
//! runtime; the task store is its only output channel.

use crate::error::AppError;
use crate::pipeline::stages;
use crate::state::{AppState, Stage, StageOutput, StageState, TaskStatus};
use chrono::Utc;
use std::sync::Arc;

/// Execute the full pipeline for a created task.
///
/// Must be called exactly once per task id: the store's single-writer
/// discipline rests on one runner owning each record. Expired tasks are
/// evicted opportunistically after every run, success or failure.
pub async fn run_pipeline(state: Arc<AppState>, task_id: String, topic: String, lang: String) {
    tracing::info!(task_id = %task_id, topic = %topic, lang = %lang, "Pipeline started");

    match drive_stages(&state, &task_id, &topic, &lang).await {
        Ok(()) => {
            state.tasks.set_status(&task_id, TaskStatus::Done, None).await;
            tracing::info!(task_id = %task_id, "Pipeline completed");
        }
        Err(e) => {
            tracing::error!(task_id = %task_id, error = %e, "Pipeline failed");
            state
                .tasks
                .set_status(&task_id, TaskStatus::Failed, Some(e.to_string()))
                .await;
        }
    }

    state.tasks.evict_expired(Utc::now()).await;
}

async fn drive_stages(
    state: &AppState,
    task_id: &str,
    topic: &str,
    lang: &str,
) -> Result<(), AppError> {
    let tasks = &state.tasks;

    tasks.set_stage(task_id, Stage::Expert, StageState::Running).await;
    let expert = stages::generate_expert(state, topic, lang).await?;
    tracing::debug!(task_id = %task_id, expert = %expert.name, "Expert stage done");
    tasks
        .set_stage(
            task_id,
            Stage::Expert,
            StageState::Done(StageOutput::Expert(expert.clone())),
        )
        .await;

    tasks.set_stage(task_id, Stage::Queries, StageState::Running).await;
    let queries = stages::generate_queries(state, &expert.description, topic, lang).await?;
    tracing::debug!(task_id = %task_id, queries = queries.len(), "Queries stage done");
    tasks
        .set_stage(
            task_id,
            Stage::Queries,
            StageState::Done(StageOutput::Queries(queries.clone())),
        )
        .await;

    tasks.set_stage(task_id, Stage::Sources, StageState::Running).await;
    let sources = stages::collect_sources(state, &queries).await?;
    tracing::debug!(task_id = %task_id, urls = sources.urls.len(), "Sources stage done");
    tasks
        .set_stage(
            task_id,
            Stage::Sources,
            StageState::Done(StageOutput::Sources(sources.digest)),
        )
        .await;

    tasks.set_stage(task_id, Stage::Context, StageState::Running).await;
    let context = stages::build_context(state, &queries, topic, &sources.urls).await?;
    tracing::debug!(task_id = %task_id, chunks = context.len(), "Context stage done");
    tasks
        .set_stage(
            task_id,
            Stage::Context,
            StageState::Done(StageOutput::Context(context.clone())),
        )
        .await;

    tasks.set_stage(task_id, Stage::Summary, StageState::Running).await;
    let summary = stages::compose_summary(state, topic, &queries, &context, lang).await?;
    tracing::debug!(task_id = %task_id, summary_len = summary.len(), "Summary stage done");
    tasks
        .set_stage(
            task_id,
            Stage::Summary,
            StageState::Done(StageOutput::Summary(summary)),
        )
        .await;

    Ok(())
}
