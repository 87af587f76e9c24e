use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compare::{Comparison, ComparisonMethod, compare_fractions};
use crate::fraction::Fraction;
use crate::model::ids::ExerciseId;

/// Error type recorded for every wrong answer.
pub const INCORRECT_COMPARISON: &str = "incorrect-comparison";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a submission is refused before scoring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("select an answer before submitting")]
    MissingAnswer,

    #[error("a justification is required")]
    EmptyJustification,
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// A single comparison exercise.
///
/// The correct answer is always derived through [`compare_fractions`], so a
/// benchmark exercise never records an inconclusive heuristic as ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    id: ExerciseId,
    fraction1: Fraction,
    fraction2: Fraction,
    correct_answer: Comparison,
    method: ComparisonMethod,
    difficulty: f64,
}

impl Exercise {
    #[must_use]
    pub fn new(
        id: ExerciseId,
        fraction1: Fraction,
        fraction2: Fraction,
        method: ComparisonMethod,
        difficulty: f64,
    ) -> Self {
        Self {
            id,
            fraction1,
            fraction2,
            correct_answer: compare_fractions(fraction1, fraction2, Some(method)),
            method,
            difficulty,
        }
    }

    #[must_use]
    pub fn id(&self) -> ExerciseId {
        self.id
    }

    #[must_use]
    pub fn fraction1(&self) -> Fraction {
        self.fraction1
    }

    #[must_use]
    pub fn fraction2(&self) -> Fraction {
        self.fraction2
    }

    #[must_use]
    pub fn correct_answer(&self) -> Comparison {
        self.correct_answer
    }

    #[must_use]
    pub fn method(&self) -> ComparisonMethod {
        self.method
    }

    #[must_use]
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// `"3/4 ? 5/6"`, the prompt shown to the learner.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{} ? {}", self.fraction1, self.fraction2)
    }

    /// `"3/4 < 5/6"`, the revealed answer.
    #[must_use]
    pub fn solution(&self) -> String {
        format!("{} {} {}", self.fraction1, self.correct_answer, self.fraction2)
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

/// Unvalidated learner input for the current exercise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub answer: Option<Comparison>,
    pub justification: String,
}

impl SubmissionDraft {
    #[must_use]
    pub fn new(answer: Comparison, justification: impl Into<String>) -> Self {
        Self {
            answer: Some(answer),
            justification: justification.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `SubmissionError::MissingAnswer` when no answer was chosen and
    /// `SubmissionError::EmptyJustification` when the justification is blank.
    pub fn validate(self) -> Result<Submission, SubmissionError> {
        let answer = self.answer.ok_or(SubmissionError::MissingAnswer)?;
        let justification = self.justification.trim();
        if justification.is_empty() {
            return Err(SubmissionError::EmptyJustification);
        }
        Ok(Submission {
            answer,
            justification: justification.to_string(),
        })
    }
}

/// A validated submission, ready to be scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    answer: Comparison,
    justification: String,
}

impl Submission {
    #[must_use]
    pub fn answer(&self) -> Comparison {
        self.answer
    }

    #[must_use]
    pub fn justification(&self) -> &str {
        &self.justification
    }
}

//
// ─── RESPONSE ──────────────────────────────────────────────────────────────────
//

/// Scored answer to one exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseResponse {
    exercise_id: ExerciseId,
    answer: Comparison,
    justification: String,
    is_correct: bool,
    time_spent_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_type: Option<String>,
}

impl ExerciseResponse {
    /// Score a validated submission against the exercise's correct answer.
    ///
    /// Negative durations (clock skew) are stored as zero.
    #[must_use]
    pub fn score(exercise: &Exercise, submission: Submission, time_spent: Duration) -> Self {
        let is_correct = submission.answer == exercise.correct_answer();
        let time_spent_ms = u64::try_from(time_spent.num_milliseconds()).unwrap_or(0);
        Self {
            exercise_id: exercise.id(),
            answer: submission.answer,
            justification: submission.justification,
            is_correct,
            time_spent_ms,
            error_type: (!is_correct).then(|| INCORRECT_COMPARISON.to_string()),
        }
    }

    #[must_use]
    pub fn exercise_id(&self) -> ExerciseId {
        self.exercise_id
    }

    #[must_use]
    pub fn answer(&self) -> Comparison {
        self.answer
    }

    #[must_use]
    pub fn justification(&self) -> &str {
        &self.justification
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn time_spent(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.time_spent_ms).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }
}

/// Percentage of correct responses, or 0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy(responses: &[ExerciseResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let correct = responses.iter().filter(|r| r.is_correct()).count();
    correct as f64 / responses.len() as f64 * 100.0
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn exercise() -> Exercise {
        Exercise::new(
            ExerciseId::new(Uuid::nil()),
            Fraction::new(3, 4).unwrap(),
            Fraction::new(5, 6).unwrap(),
            ComparisonMethod::CommonDenominator,
            3.0,
        )
    }

    #[test]
    fn exercise_computes_answer_and_formats() {
        let ex = exercise();
        assert_eq!(ex.correct_answer(), Comparison::Less);
        assert_eq!(ex.prompt(), "3/4 ? 5/6");
        assert_eq!(ex.solution(), "3/4 < 5/6");
    }

    #[test]
    fn blank_justification_is_rejected() {
        let draft = SubmissionDraft::new(Comparison::Less, "   ");
        assert_eq!(draft.validate(), Err(SubmissionError::EmptyJustification));
    }

    #[test]
    fn missing_answer_is_rejected() {
        let draft = SubmissionDraft {
            answer: None,
            justification: "because".into(),
        };
        assert_eq!(draft.validate(), Err(SubmissionError::MissingAnswer));
    }

    #[test]
    fn wrong_answer_is_tagged() {
        let ex = exercise();
        let submission = SubmissionDraft::new(Comparison::Greater, "5/6 is smaller")
            .validate()
            .unwrap();
        let response = ExerciseResponse::score(&ex, submission, Duration::seconds(12));
        assert!(!response.is_correct());
        assert_eq!(response.error_type(), Some(INCORRECT_COMPARISON));
        assert_eq!(response.time_spent(), Duration::seconds(12));
    }

    #[test]
    fn right_answer_has_no_error_type() {
        let ex = exercise();
        let submission = SubmissionDraft::new(Comparison::Less, " 9/12 < 10/12 ")
            .validate()
            .unwrap();
        let response = ExerciseResponse::score(&ex, submission, Duration::milliseconds(-5));
        assert!(response.is_correct());
        assert_eq!(response.error_type(), None);
        assert_eq!(response.justification(), "9/12 < 10/12");
        assert_eq!(response.time_spent(), Duration::zero());
    }

    #[test]
    fn accuracy_of_empty_slice_is_zero() {
        assert!(accuracy(&[]).abs() < f64::EPSILON);
    }
}
