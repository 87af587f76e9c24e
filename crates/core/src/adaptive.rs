use std::collections::VecDeque;

use crate::model::{MAX_DIFFICULTY, MIN_DIFFICULTY};
use crate::settings::CurriculumSettings;

/// Band above the target before difficulty is raised.
const RAISE_MARGIN: f64 = 5.0;
/// Band below the target before difficulty is lowered.
const LOWER_MARGIN: f64 = 10.0;

/// A single difficulty step taken by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    Raised { from: f64, to: f64 },
    Lowered { from: f64, to: f64 },
}

impl Adjustment {
    #[must_use]
    pub fn difficulty(self) -> f64 {
        match self {
            Self::Raised { to, .. } | Self::Lowered { to, .. } => to,
        }
    }
}

/// Hysteresis controller that retunes practice difficulty from recent accuracy.
///
/// Each answer produces one accuracy sample: the percentage correct among
/// the trailing `accuracy_window` answers. Evaluation averages the last
/// `evaluation_window` samples and takes at most one step. The raise band
/// (+5) is narrower than the lower band (-10).
///
/// # Examples
///
/// ```
/// # use fraction_core::adaptive::AdaptiveController;
/// let mut controller = AdaptiveController::new(3.0, 82.5);
/// for _ in 0..3 {
///     controller.push_sample(100.0);
/// }
/// controller.evaluate();
/// assert_eq!(controller.difficulty(), 3.5);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveController {
    difficulty: f64,
    target_accuracy: f64,
    step: f64,
    accuracy_window: usize,
    evaluation_window: usize,
    answers: VecDeque<bool>,
    samples: VecDeque<f64>,
}

impl AdaptiveController {
    /// Controller with the default windows (5 answers, 3 samples) and a 0.5 step.
    #[must_use]
    pub fn new(start_difficulty: f64, target_accuracy: f64) -> Self {
        let defaults = CurriculumSettings::default();
        Self::with_windows(
            start_difficulty,
            target_accuracy,
            defaults.difficulty_step(),
            defaults.accuracy_window(),
            defaults.evaluation_window(),
        )
    }

    #[must_use]
    pub fn from_settings(start_difficulty: f64, settings: &CurriculumSettings) -> Self {
        Self::with_windows(
            start_difficulty,
            settings.target_accuracy(),
            settings.difficulty_step(),
            settings.accuracy_window(),
            settings.evaluation_window(),
        )
    }

    fn with_windows(
        start_difficulty: f64,
        target_accuracy: f64,
        step: f64,
        accuracy_window: usize,
        evaluation_window: usize,
    ) -> Self {
        let accuracy_window = accuracy_window.max(1);
        Self {
            difficulty: start_difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
            target_accuracy,
            step,
            accuracy_window,
            evaluation_window: evaluation_window.clamp(1, accuracy_window),
            answers: VecDeque::with_capacity(accuracy_window),
            samples: VecDeque::with_capacity(accuracy_window),
        }
    }

    #[must_use]
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    #[must_use]
    pub fn target_accuracy(&self) -> f64 {
        self.target_accuracy
    }

    /// Accuracy samples currently in the window, oldest first.
    #[must_use]
    pub fn samples(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Record one answer and return the accuracy sample it produced.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_answer(&mut self, correct: bool) -> f64 {
        if self.answers.len() == self.accuracy_window {
            self.answers.pop_front();
        }
        self.answers.push_back(correct);

        let hits = self.answers.iter().filter(|&&c| c).count();
        let sample = hits as f64 / self.answers.len() as f64 * 100.0;
        self.push_sample(sample);
        sample
    }

    /// Record one answer and evaluate in a single call.
    pub fn record(&mut self, correct: bool) -> Option<Adjustment> {
        self.record_answer(correct);
        self.evaluate()
    }

    /// Push a precomputed accuracy sample (percent).
    pub fn push_sample(&mut self, accuracy: f64) {
        if self.samples.len() == self.accuracy_window {
            self.samples.pop_front();
        }
        self.samples.push_back(accuracy);
    }

    /// Average the most recent samples and take at most one step.
    ///
    /// Returns `None` until enough samples exist or when the mean sits inside
    /// the tolerance band.
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&mut self) -> Option<Adjustment> {
        if self.samples.len() < self.evaluation_window {
            return None;
        }
        let recent = self.samples.iter().rev().take(self.evaluation_window);
        let mean = recent.sum::<f64>() / self.evaluation_window as f64;
        let from = self.difficulty;

        if mean > self.target_accuracy + RAISE_MARGIN && from < MAX_DIFFICULTY {
            self.difficulty = (from + self.step).min(MAX_DIFFICULTY);
            return Some(Adjustment::Raised {
                from,
                to: self.difficulty,
            });
        }
        if mean < self.target_accuracy - LOWER_MARGIN && from > MIN_DIFFICULTY {
            self.difficulty = (from - self.step).max(MIN_DIFFICULTY);
            return Some(Adjustment::Lowered {
                from,
                to: self.difficulty,
            });
        }
        None
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
