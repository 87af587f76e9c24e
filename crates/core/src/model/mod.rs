mod error_log;
mod exercise;
mod ids;
mod progress;
mod session;

pub use ids::{ExerciseId, ParseIdError, SessionId};

pub use error_log::ErrorLog;
pub use exercise::{
    Exercise, ExerciseResponse, INCORRECT_COMPARISON, Submission, SubmissionDraft,
    SubmissionError, accuracy,
};
pub use progress::{
    FINISHED_SESSION, MAX_DIFFICULTY, MIN_DIFFICULTY, Progress, SessionStatus,
};
pub use session::{SESSION_COUNT, Session, SessionNumber, SessionRecordError};
