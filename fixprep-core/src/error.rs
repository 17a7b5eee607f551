//! Error types for the prepare pipeline.
//!
//! Fixture-level errors (missing directory, missing template, failed
//! collaborator) are recovered by the pipeline and recorded as outcomes.
//! Only invalid input stops a run before it starts.

use camino::Utf8PathBuf;
use fixprep_types::report::{OutcomeStatus, Step};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("directory \"{0}\" not found")]
    DirectoryMissing(Utf8PathBuf),

    #[error("no \"{template}\" file found in {directory}, skipped")]
    TemplateMissing {
        directory: Utf8PathBuf,
        template: String,
    },

    #[error("{} failed: {message}", .step.command_name())]
    CollaboratorFailure { step: Step, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Category of a [`PrepareError`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DirectoryMissing,
    TemplateMissing,
    CollaboratorFailure,
    InvalidInput,
    Internal,
}

impl PrepareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrepareError::DirectoryMissing(_) => ErrorKind::DirectoryMissing,
            PrepareError::TemplateMissing { .. } => ErrorKind::TemplateMissing,
            PrepareError::CollaboratorFailure { .. } => ErrorKind::CollaboratorFailure,
            PrepareError::InvalidInput(_) => ErrorKind::InvalidInput,
            PrepareError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Outcome recorded when this error ends a fixture.
    ///
    /// I/O failures inside a fixture count as collaborator errors. Invalid
    /// input never reaches a fixture.
    pub fn outcome_status(&self) -> OutcomeStatus {
        match self.kind() {
            ErrorKind::DirectoryMissing => OutcomeStatus::SkippedMissingDirectory,
            ErrorKind::TemplateMissing => OutcomeStatus::SkippedMissingTemplate,
            ErrorKind::CollaboratorFailure | ErrorKind::InvalidInput | ErrorKind::Internal => {
                OutcomeStatus::CompletedWithCollaboratorError
            }
        }
    }
}
