use thiserror::Error;

use crate::fraction::FractionError;
use crate::model::{SessionRecordError, SubmissionError};
use crate::phase::PhaseError;
use crate::settings::SettingsError;

/// Umbrella error for callers that only need to propagate core failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Fraction(#[from] FractionError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    SessionRecord(#[from] SessionRecordError),
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
