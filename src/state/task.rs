//! Task data model
//!
//! One `Task` tracks a single end-to-end pipeline run: its overall status,
//! a per-stage map of results, and the creation timestamp used for eviction.

use crate::generation::schemas::Expert;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Unique identifier for a task
pub type TaskId = String;

/// Overall task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Pipeline is still executing
    Running,
    /// All five stages completed
    Done,
    /// A stage failed; `Task::error` holds the message
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal (absorbing)
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

/// The five pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Persona synthesis
    Expert,
    /// Search query derivation
    Queries,
    /// Web search and source collection
    Sources,
    /// Context retrieval and filtering
    Context,
    /// Narrative composition
    Summary,
}

impl Stage {
    /// Stage name as it appears in the `steps` map
    pub fn name(self) -> &'static str {
        match self {
            Stage::Expert => "expert",
            Stage::Queries => "queries",
            Stage::Sources => "sources",
            Stage::Context => "context",
            Stage::Summary => "summary",
        }
    }
}

/// A context chunk surfaced to the client: a filtered extract with citation id
/// and source presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    /// 1-based citation id, dense within a task
    pub id: usize,
    /// Title of the source page
    pub title: String,
    /// Display name of the source site (or `Source N` fallback)
    pub author: String,
    /// The extract text
    pub content: String,
    /// URL the extract was pulled from
    pub source_url: String,
    /// Favicon URL for the source (or the bundled fallback icon)
    pub icon_url: String,
}

/// Completed output of a single stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StageOutput {
    /// Stage 1: the synthesized persona
    Expert(Expert),
    /// Stage 2: the derived search queries
    Queries(Vec<String>),
    /// Stage 3: human-readable markdown digest of search results
    Sources(String),
    /// Stage 4: filtered, deduplicated context chunks
    Context(Vec<ContextChunk>),
    /// Stage 5: the final narrative text
    Summary(String),
}

/// Value recorded for a stage in the `steps` map: either the in-progress
/// marker (visible to pollers while the stage runs) or its final output.
#[derive(Debug, Clone, PartialEq)]
pub enum StageState {
    /// The stage has started but not finished
    Running,
    /// The stage finished with this output
    Done(StageOutput),
}

impl Serialize for StageState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StageState::Running => serializer.serialize_str("running"),
            StageState::Done(output) => output.serialize(serializer),
        }
    }
}

/// One end-to-end pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Overall status
    pub status: TaskStatus,
    /// Per-stage results, keyed by stage name, populated as stages run
    pub steps: BTreeMap<Stage, StageState>,
    /// Creation timestamp, drives 24h eviction
    pub created_at: DateTime<Utc>,
    /// Failure message, present only when status is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    /// Create a fresh task in the `running` state with no stage entries
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            status: TaskStatus::Running,
            steps: BTreeMap::new(),
            created_at,
            error: None,
        }
    }
}
