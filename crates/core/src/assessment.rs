use rand::Rng;

use crate::compare::ComparisonMethod;
use crate::generator::ExerciseGenerator;
use crate::model::{Exercise, ExerciseResponse};

/// Lowest difficulty used by the assessment cycle (2, 3, 4, 2, 3, 4, ...).
const ASSESSMENT_BASE_DIFFICULTY: f64 = 2.0;

/// Difficulty and method for question `index`, assigned round-robin.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn assessment_slot(index: usize) -> (f64, ComparisonMethod) {
    let cycle = ComparisonMethod::ALL.len();
    let difficulty = ASSESSMENT_BASE_DIFFICULTY + (index % cycle) as f64;
    (difficulty, ComparisonMethod::ALL[index % cycle])
}

/// Generate the full assessment up front, independent of adaptive difficulty.
pub fn generate_assessment<R: Rng>(
    generator: &mut ExerciseGenerator<R>,
    count: usize,
) -> Vec<Exercise> {
    (0..count)
        .map(|index| {
            let (difficulty, method) = assessment_slot(index);
            generator.generate_exercise(difficulty, method)
        })
        .collect()
}

/// Scored result of an assessment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentOutcome {
    pub correct: usize,
    pub total: usize,
    /// Unrounded percentage, `correct / total × 100`.
    pub score: f64,
    pub passed: bool,
}

impl AssessmentOutcome {
    /// Score responses against a fixed question count.
    ///
    /// The denominator is `total`, not the number of responses, so an
    /// abandoned assessment can never pass early.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(responses: &[ExerciseResponse], total: usize, mastery_threshold: f64) -> Self {
        let correct = responses.iter().filter(|r| r.is_correct()).count();
        let score = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        Self {
            correct,
            total,
            score,
            passed: score >= mastery_threshold,
        }
    }

    /// Score rounded to two decimals for display.
    #[must_use]
    pub fn rounded_score(&self) -> f64 {
        (self.score * 100.0).round() / 100.0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
