use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::exercise::{ExerciseResponse, INCORRECT_COMPARISON};
use crate::model::ids::ExerciseId;
use crate::model::session::SessionNumber;

/// Record of a single incorrect response. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    pub session_number: SessionNumber,
    pub exercise_id: ExerciseId,
    pub error_type: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorLog {
    #[must_use]
    pub fn new(
        session_number: SessionNumber,
        exercise_id: ExerciseId,
        error_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            session_number,
            exercise_id,
            error_type: error_type.into(),
            timestamp,
        }
    }

    /// Log entry for a scored response, or `None` if it was correct.
    #[must_use]
    pub fn for_response(
        session_number: SessionNumber,
        response: &ExerciseResponse,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        if response.is_correct() {
            return None;
        }
        Some(Self::new(
            session_number,
            response.exercise_id(),
            response.error_type().unwrap_or(INCORRECT_COMPARISON),
            timestamp,
        ))
    }
}
