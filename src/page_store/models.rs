use crate::generator::GeneratedPage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted page as the rendering side reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPage {
    pub page: GeneratedPage,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Generation Runs
// =============================================================================

/// Lifecycle of a bulk generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(RunStatus::Running),
            "completed" => Some(RunStatus::Completed),
            "cancelled" => Some(RunStatus::Cancelled),
            "failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }
}

/// Final counts written when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub inserted: u64,
    pub duplicates: u64,
    pub errors: u64,
    pub skipped_invalid: u64,
    pub elapsed_ms: u64,
}

/// One row of the run ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRun {
    pub id: String,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// The request as JSON, kept verbatim for auditing.
    pub request_json: String,
    pub requested: u64,
    pub totals: RunTotals,
    pub error_message: Option<String>,
}
