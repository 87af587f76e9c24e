//! Shared error types for the services crate.

use thiserror::Error;

use fraction_core::model::{SessionNumber, SessionRecordError, SubmissionError};
use fraction_core::phase::PhaseError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session {0} is locked")]
    Locked(SessionNumber),
    #[error("cannot {action} during the {phase} phase")]
    WrongPhase {
        phase: &'static str,
        action: &'static str,
    },
    #[error("finish reading the lesson first (page {page} of {pages})")]
    LessonIncomplete { page: usize, pages: usize },
    #[error("no exercise is waiting for an answer")]
    NoExercise,
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error(transparent)]
    Record(#[from] SessionRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `MetricsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetricsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
