//! In-memory task store
//!
//! Process-wide mapping from task id to task state, shared between the HTTP
//! handlers and the pipeline runs. The map itself is guarded by a `RwLock`
//! for structural operations (insert/evict); per-task field writes rely on
//! the single-writer-per-id discipline — only the pipeline driving a task
//! ever mutates it.

use crate::error::AppError;
use crate::state::task::{Stage, StageState, Task, TaskId, TaskStatus};
use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tasks older than this are removed by `evict_expired`
const TASK_EXPIRATION_HOURS: i64 = 24;

/// Shared, process-wide task registry
#[derive(Clone, Default)]
pub struct TaskStore {
    inner: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task in the `running` state.
    ///
    /// Fails if the id is already present — with UUID v4 ids this indicates
    /// a logic error, not a collision to paper over.
    pub async fn create(&self, id: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut tasks = self.inner.write().await;
        if tasks.contains_key(id) {
            return Err(AppError::Internal(anyhow!(
                "task id already registered: {}",
                id
            )));
        }
        tasks.insert(id.to_string(), Task::new(now));
        Ok(())
    }

    /// Snapshot a task by id.
    ///
    /// Returns a clone taken under the read lock, so a poller never observes
    /// a half-written record.
    pub async fn get(&self, id: &str) -> Option<Task> {
        self.inner.read().await.get(id).cloned()
    }

    /// Record a stage value (running marker or result) for a task.
    ///
    /// Writes to a terminal task are ignored: finished records are only ever
    /// removed by eviction, never mutated.
    pub async fn set_stage(&self, id: &str, stage: Stage, value: StageState) {
        let mut tasks = self.inner.write().await;
        match tasks.get_mut(id) {
            Some(task) if !task.status.is_terminal() => {
                task.steps.insert(stage, value);
            }
            Some(_) => {
                tracing::warn!(task_id = %id, stage = stage.name(), "Ignoring stage write to terminal task");
            }
            None => {
                tracing::warn!(task_id = %id, stage = stage.name(), "Stage write for unknown task");
            }
        }
    }

    /// Transition a task's overall status, recording the error message when
    /// it fails. Terminal states are absorbing.
    pub async fn set_status(&self, id: &str, status: TaskStatus, error: Option<String>) {
        let mut tasks = self.inner.write().await;
        match tasks.get_mut(id) {
            Some(task) if !task.status.is_terminal() => {
                task.status = status;
                task.error = error;
            }
            Some(_) => {
                tracing::warn!(task_id = %id, "Ignoring status write to terminal task");
            }
            None => {
                tracing::warn!(task_id = %id, "Status write for unknown task");
            }
        }
    }

    /// Remove every task whose creation timestamp is older than 24 hours.
    ///
    /// Called opportunistically after each pipeline run.
    pub async fn evict_expired(&self, now: DateTime<Utc>) {
        let cutoff = Duration::hours(TASK_EXPIRATION_HOURS);
        let mut tasks = self.inner.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| now - task.created_at <= cutoff);
        let evicted = before - tasks.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = tasks.len(), "Evicted expired tasks");
        }
    }

    /// Number of tasks currently held
    #[allow(dead_code)] // Used by tests and diagnostics
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store holds no tasks
    #[allow(dead_code)] // Used by tests and diagnostics
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
