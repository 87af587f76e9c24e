use thiserror::Error;

use crate::assessment::AssessmentOutcome;
use crate::compare::ComparisonMethod;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhaseError {
    #[error("cannot {action} during the {phase} phase")]
    InvalidTransition {
        phase: &'static str,
        action: &'static str,
    },
}

/// Phase of a single session attempt.
///
/// ```text
/// Instruction{0} -> Instruction{1} -> Instruction{2} -> Practice -> Assessment
///                                                                   |-> Complete
///                                                                   `-> Retry -> Instruction{0}
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    Instruction { method_index: usize },
    Practice,
    Assessment,
    Retry { score: f64 },
    Complete { score: f64 },
}

impl Default for SessionPhase {
    fn default() -> Self {
        Self::Instruction { method_index: 0 }
    }
}

impl SessionPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Instruction { .. } => "instruction",
            Self::Practice => "practice",
            Self::Assessment => "assessment",
            Self::Retry { .. } => "retry",
            Self::Complete { .. } => "complete",
        }
    }

    /// Method being taught, while in instruction.
    #[must_use]
    pub fn current_method(&self) -> Option<ComparisonMethod> {
        match self {
            Self::Instruction { method_index } => ComparisonMethod::ALL.get(*method_index).copied(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// The learner acknowledged the current method.
    ///
    /// # Errors
    ///
    /// Returns `PhaseError::InvalidTransition` outside instruction.
    pub fn acknowledge_method(self) -> Result<Self, PhaseError> {
        match self {
            Self::Instruction { method_index } if method_index + 1 < ComparisonMethod::ALL.len() => {
                Ok(Self::Instruction {
                    method_index: method_index + 1,
                })
            }
            Self::Instruction { .. } => Ok(Self::Practice),
            other => Err(other.invalid("acknowledge a method")),
        }
    }

    /// # Errors
    ///
    /// Returns `PhaseError::InvalidTransition` outside practice.
    pub fn finish_practice(self) -> Result<Self, PhaseError> {
        match self {
            Self::Practice => Ok(Self::Assessment),
            other => Err(other.invalid("finish practice")),
        }
    }

    /// # Errors
    ///
    /// Returns `PhaseError::InvalidTransition` outside assessment.
    pub fn finish_assessment(self, outcome: &AssessmentOutcome) -> Result<Self, PhaseError> {
        match self {
            Self::Assessment if outcome.passed => Ok(Self::Complete {
                score: outcome.score,
            }),
            Self::Assessment => Ok(Self::Retry {
                score: outcome.score,
            }),
            other => Err(other.invalid("finish the assessment")),
        }
    }

    /// Loop back to the first method after a failed assessment.
    ///
    /// # Errors
    ///
    /// Returns `PhaseError::InvalidTransition` outside retry.
    pub fn retry(self) -> Result<Self, PhaseError> {
        match self {
            Self::Retry { .. } => Ok(Self::default()),
            other => Err(other.invalid("retry")),
        }
    }

    fn invalid(self, action: &'static str) -> PhaseError {
        PhaseError::InvalidTransition {
            phase: self.name(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(correct: usize) -> AssessmentOutcome {
        AssessmentOutcome::score(&[], 12, 90.0).with_correct(correct)
    }

    impl AssessmentOutcome {
        fn with_correct(mut self, correct: usize) -> Self {
            self.correct = correct;
            self.score = correct as f64 / self.total as f64 * 100.0;
            self.passed = self.score >= 90.0;
            self
        }
    }

    #[test]
    fn instruction_steps_through_all_methods() {
        let mut phase = SessionPhase::default();
        let mut taught = Vec::new();
        while let Some(method) = phase.current_method() {
            taught.push(method);
            phase = phase.acknowledge_method().unwrap();
        }
        assert_eq!(taught, ComparisonMethod::ALL);
        assert_eq!(phase, SessionPhase::Practice);
    }

    #[test]
    fn passing_assessment_completes() {
        let phase = SessionPhase::Assessment.finish_assessment(&outcome(11)).unwrap();
        assert!(matches!(phase, SessionPhase::Complete { .. }));
        assert!(phase.is_terminal());
    }

    #[test]
    fn failing_assessment_retries_from_first_method() {
        let phase = SessionPhase::Assessment.finish_assessment(&outcome(10)).unwrap();
        assert!(matches!(phase, SessionPhase::Retry { .. }));
        let phase = phase.retry().unwrap();
        assert_eq!(phase, SessionPhase::Instruction { method_index: 0 });
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        assert!(SessionPhase::Practice.acknowledge_method().is_err());
        assert!(SessionPhase::default().finish_practice().is_err());
        assert!(SessionPhase::Practice.finish_assessment(&outcome(12)).is_err());
        assert_eq!(
            SessionPhase::Complete { score: 100.0 }.retry(),
            Err(PhaseError::InvalidTransition {
                phase: "complete",
                action: "retry",
            })
        );
    }
}
