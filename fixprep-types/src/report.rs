use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// One entry per fixture attempted, in processing order.
    #[serde(default)]
    pub outcomes: Vec<FixtureOutcome>,
}

impl RunReport {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            schema: crate::schema::FIXPREP_REPORT_V1.to_string(),
            tool,
            started_at: Utc::now(),
            ended_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                OutcomeStatus::Completed => summary.completed += 1,
                OutcomeStatus::SkippedMissingDirectory | OutcomeStatus::SkippedMissingTemplate => {
                    summary.skipped += 1
                }
                OutcomeStatus::CompletedWithCollaboratorError => summary.failed += 1,
            }
        }
        summary
    }

    /// True when every fixture completed without warnings.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_completed())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureOutcome {
    pub directory: String,
    pub databases: Vec<String>,
    pub status: OutcomeStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Collaborator steps that ran, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Completed,
    SkippedMissingDirectory,
    SkippedMissingTemplate,
    CompletedWithCollaboratorError,
}

impl OutcomeStatus {
    pub fn is_completed(self) -> bool {
        self == OutcomeStatus::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Completed => "completed",
            OutcomeStatus::SkippedMissingDirectory => "skipped_missing_directory",
            OutcomeStatus::SkippedMissingTemplate => "skipped_missing_template",
            OutcomeStatus::CompletedWithCollaboratorError => "completed_with_collaborator_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub status: StepStatus,
}

/// The external build collaborators, in the order a fixture runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    BuildSql,
    InsertSql,
    BuildConfig,
    BuildModel,
}

impl Step {
    /// Subcommand name understood by the generator binary.
    pub fn command_name(self) -> &'static str {
        match self {
            Step::BuildSql => "sql:build",
            Step::InsertSql => "sql:insert",
            Step::BuildConfig => "config:build",
            Step::BuildModel => "model:build",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u64,
    pub skipped: u64,
    pub failed: u64,
}
