use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::exercise::{ExerciseResponse, accuracy};
use crate::model::ids::SessionId;

/// Number of sessions in the curriculum.
pub const SESSION_COUNT: u8 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRecordError {
    #[error("session number must be between 1 and {SESSION_COUNT}, got {0}")]
    InvalidNumber(u8),

    #[error("end time is before start time")]
    InvalidTimeRange,

    #[error("session already finalized")]
    AlreadyFinalized,
}

//
// ─── SESSION NUMBER ────────────────────────────────────────────────────────────
//

/// Position of a session in the five-session curriculum (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SessionNumber(u8);

impl SessionNumber {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(SESSION_COUNT);

    /// # Errors
    ///
    /// Returns `SessionRecordError::InvalidNumber` outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, SessionRecordError> {
        if (1..=SESSION_COUNT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SessionRecordError::InvalidNumber(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The following session, or `None` after the last one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=SESSION_COUNT).map(Self)
    }
}

impl TryFrom<u8> for SessionNumber {
    type Error = SessionRecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionNumber> for u8 {
    fn from(n: SessionNumber) -> Self {
        n.0
    }
}

impl fmt::Display for SessionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Record of one session attempt.
///
/// Created when the attempt starts, collects practice and assessment
/// responses, and is finalized once the assessment is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    session_number: SessionNumber,
    start_time: DateTime<Utc>,
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
    completed: bool,
    exercises: Vec<ExerciseResponse>,
    #[serde(default)]
    quiz_score: Option<f64>,
    #[serde(default)]
    quiz_passed: Option<bool>,
}

impl Session {
    #[must_use]
    pub fn start(id: SessionId, session_number: SessionNumber, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            session_number,
            start_time,
            end_time: None,
            completed: false,
            exercises: Vec::new(),
            quiz_score: None,
            quiz_passed: None,
        }
    }

    /// Append responses in submission order.
    pub fn extend_exercises(&mut self, responses: impl IntoIterator<Item = ExerciseResponse>) {
        self.exercises.extend(responses);
    }

    /// Close the attempt with its assessment result.
    ///
    /// # Errors
    ///
    /// Returns `SessionRecordError::AlreadyFinalized` on a second call and
    /// `SessionRecordError::InvalidTimeRange` if `end_time` precedes the start.
    pub fn finalize(
        &mut self,
        end_time: DateTime<Utc>,
        quiz_score: f64,
        quiz_passed: bool,
    ) -> Result<(), SessionRecordError> {
        if self.completed {
            return Err(SessionRecordError::AlreadyFinalized);
        }
        if end_time < self.start_time {
            return Err(SessionRecordError::InvalidTimeRange);
        }
        self.end_time = Some(end_time);
        self.completed = true;
        self.quiz_score = Some(quiz_score);
        self.quiz_passed = Some(quiz_passed);
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn session_number(&self) -> SessionNumber {
        self.session_number
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn exercises(&self) -> &[ExerciseResponse] {
        &self.exercises
    }

    #[must_use]
    pub fn quiz_score(&self) -> Option<f64> {
        self.quiz_score
    }

    #[must_use]
    pub fn quiz_passed(&self) -> Option<bool> {
        self.quiz_passed
    }

    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }

    /// Wall-clock length in fractional minutes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_minutes(&self) -> Option<f64> {
        self.duration()
            .map(|d| d.num_milliseconds() as f64 / 60_000.0)
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.exercises.iter().filter(|e| !e.is_correct()).count()
    }

    /// Overall accuracy across practice and assessment responses.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        accuracy(&self.exercises)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn session_numbers_are_bounded() {
        assert!(SessionNumber::new(0).is_err());
        assert!(SessionNumber::new(6).is_err());
        assert_eq!(SessionNumber::new(3).unwrap().next(), SessionNumber::new(4).ok());
        assert_eq!(SessionNumber::LAST.next(), None);
        assert_eq!(SessionNumber::all().count(), 5);
    }

    #[test]
    fn finalize_sets_outcome_once() {
        let now = fixed_now();
        let mut session = Session::start(SessionId::random(), SessionNumber::FIRST, now);
        session
            .finalize(now + Duration::minutes(42), 91.5, true)
            .unwrap();

        assert!(session.is_completed());
        assert_eq!(session.quiz_passed(), Some(true));
        assert!((session.duration_minutes().unwrap() - 42.0).abs() < f64::EPSILON);
        assert_eq!(
            session.finalize(now + Duration::minutes(50), 50.0, false),
            Err(SessionRecordError::AlreadyFinalized)
        );
    }

    #[test]
    fn finalize_rejects_reversed_times() {
        let now = fixed_now();
        let mut session = Session::start(SessionId::random(), SessionNumber::FIRST, now);
        assert_eq!(
            session.finalize(now - Duration::seconds(1), 100.0, true),
            Err(SessionRecordError::InvalidTimeRange)
        );
        assert!(!session.is_completed());
    }

    #[test]
    fn invalid_session_number_fails_to_deserialize() {
        let err = serde_json::from_str::<SessionNumber>("9");
        assert!(err.is_err());
    }
}
