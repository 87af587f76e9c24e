use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("practice round must contain at least one exercise")]
    InvalidPracticeCount,

    #[error("assessment must contain at least one exercise")]
    InvalidAssessmentCount,

    #[error("mastery threshold must be in (0, 100], got {0}")]
    InvalidMasteryThreshold(f64),

    #[error("target accuracy must be in [0, 100], got {0}")]
    InvalidTargetAccuracy(f64),

    #[error("evaluation window ({evaluation}) must be in 1..={accuracy}")]
    InvalidWindows { accuracy: usize, evaluation: usize },

    #[error("difficulty step must be in (0, 4], got {0}")]
    InvalidDifficultyStep(f64),

    #[error("pair generation needs at least one attempt")]
    InvalidAttemptCap,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Tunable constants of the curriculum.
///
/// The defaults reproduce the standard five-session course: 10 practice
/// exercises, 12 assessment questions, a 90% mastery threshold and an 82.5%
/// practice target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumSettings {
    practice_exercises: usize,
    assessment_exercises: usize,
    mastery_threshold: f64,
    target_accuracy: f64,
    accuracy_window: usize,
    evaluation_window: usize,
    difficulty_step: f64,
    max_pair_attempts: u32,
}

impl Default for CurriculumSettings {
    fn default() -> Self {
        Self {
            practice_exercises: 10,
            assessment_exercises: 12,
            mastery_threshold: 90.0,
            target_accuracy: 82.5,
            accuracy_window: 5,
            evaluation_window: 3,
            difficulty_step: 0.5,
            max_pair_attempts: 20,
        }
    }
}

impl CurriculumSettings {
    /// Creates custom settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when any value is out of range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        practice_exercises: usize,
        assessment_exercises: usize,
        mastery_threshold: f64,
        target_accuracy: f64,
        accuracy_window: usize,
        evaluation_window: usize,
        difficulty_step: f64,
        max_pair_attempts: u32,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            practice_exercises,
            assessment_exercises,
            mastery_threshold,
            target_accuracy,
            accuracy_window,
            evaluation_window,
            difficulty_step,
            max_pair_attempts,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Default settings with a different practice target.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidTargetAccuracy` outside `[0, 100]`.
    pub fn with_target_accuracy(mut self, target_accuracy: f64) -> Result<Self, SettingsError> {
        self.target_accuracy = target_accuracy;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.practice_exercises == 0 {
            return Err(SettingsError::InvalidPracticeCount);
        }
        if self.assessment_exercises == 0 {
            return Err(SettingsError::InvalidAssessmentCount);
        }
        if !(self.mastery_threshold > 0.0 && self.mastery_threshold <= 100.0) {
            return Err(SettingsError::InvalidMasteryThreshold(self.mastery_threshold));
        }
        if !(0.0..=100.0).contains(&self.target_accuracy) {
            return Err(SettingsError::InvalidTargetAccuracy(self.target_accuracy));
        }
        if self.evaluation_window == 0 || self.evaluation_window > self.accuracy_window {
            return Err(SettingsError::InvalidWindows {
                accuracy: self.accuracy_window,
                evaluation: self.evaluation_window,
            });
        }
        if !(self.difficulty_step > 0.0 && self.difficulty_step <= 4.0) {
            return Err(SettingsError::InvalidDifficultyStep(self.difficulty_step));
        }
        if self.max_pair_attempts == 0 {
            return Err(SettingsError::InvalidAttemptCap);
        }
        Ok(())
    }

    #[must_use]
    pub fn practice_exercises(&self) -> usize {
        self.practice_exercises
    }

    #[must_use]
    pub fn assessment_exercises(&self) -> usize {
        self.assessment_exercises
    }

    #[must_use]
    pub fn mastery_threshold(&self) -> f64 {
        self.mastery_threshold
    }

    #[must_use]
    pub fn target_accuracy(&self) -> f64 {
        self.target_accuracy
    }

    #[must_use]
    pub fn accuracy_window(&self) -> usize {
        self.accuracy_window
    }

    #[must_use]
    pub fn evaluation_window(&self) -> usize {
        self.evaluation_window
    }

    #[must_use]
    pub fn difficulty_step(&self) -> f64 {
        self.difficulty_step
    }

    #[must_use]
    pub fn max_pair_attempts(&self) -> u32 {
        self.max_pair_attempts
    }
}
