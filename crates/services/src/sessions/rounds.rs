use rand::Rng;

use fraction_core::adaptive::{AdaptiveController, Adjustment};
use fraction_core::assessment::{AssessmentOutcome, generate_assessment};
use fraction_core::generator::ExerciseGenerator;
use fraction_core::model::{Exercise, ExerciseResponse, accuracy};

//
// ─── PRACTICE ──────────────────────────────────────────────────────────────────
//

/// Adaptive practice round.
///
/// Exercises are generated one at a time at the controller's current
/// difficulty, so each answer can retune the next question.
#[derive(Debug, Clone)]
pub struct PracticeRound {
    controller: AdaptiveController,
    total: usize,
    current: Option<Exercise>,
    responses: Vec<ExerciseResponse>,
}

impl PracticeRound {
    pub(crate) fn start<R: Rng>(
        controller: AdaptiveController,
        total: usize,
        generator: &mut ExerciseGenerator<R>,
    ) -> Self {
        let mut round = Self {
            controller,
            total,
            current: None,
            responses: Vec::with_capacity(total),
        };
        round.present_next(generator);
        round
    }

    #[must_use]
    pub fn current(&self) -> Option<&Exercise> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn difficulty(&self) -> f64 {
        self.controller.difficulty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.responses.len() >= self.total
    }

    /// Percentage correct over the answered exercises.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        accuracy(&self.responses)
    }

    #[must_use]
    pub fn responses(&self) -> &[ExerciseResponse] {
        &self.responses
    }

    /// Store a scored response and present the next exercise.
    ///
    /// The controller is only evaluated while another exercise follows.
    pub(crate) fn record<R: Rng>(
        &mut self,
        response: ExerciseResponse,
        generator: &mut ExerciseGenerator<R>,
    ) -> Option<Adjustment> {
        let correct = response.is_correct();
        self.responses.push(response);

        if self.is_finished() {
            self.controller.record_answer(correct);
            self.current = None;
            return None;
        }
        let adjustment = self.controller.record(correct);
        self.present_next(generator);
        adjustment
    }

    pub(crate) fn into_responses(self) -> Vec<ExerciseResponse> {
        self.responses
    }

    fn present_next<R: Rng>(&mut self, generator: &mut ExerciseGenerator<R>) {
        if self.is_finished() {
            self.current = None;
            return;
        }
        let method = generator.pick_method();
        self.current = Some(generator.generate_exercise(self.controller.difficulty(), method));
    }
}

//
// ─── ASSESSMENT ────────────────────────────────────────────────────────────────
//

/// Fixed assessment, generated up front.
#[derive(Debug, Clone)]
pub struct AssessmentRound {
    exercises: Vec<Exercise>,
    responses: Vec<ExerciseResponse>,
}

impl AssessmentRound {
    pub(crate) fn start<R: Rng>(generator: &mut ExerciseGenerator<R>, count: usize) -> Self {
        Self {
            exercises: generate_assessment(generator, count),
            responses: Vec::with_capacity(count),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&Exercise> {
        self.exercises.get(self.responses.len())
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.responses.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.responses.len() >= self.exercises.len()
    }

    #[must_use]
    pub fn outcome(&self, mastery_threshold: f64) -> AssessmentOutcome {
        AssessmentOutcome::score(&self.responses, self.exercises.len(), mastery_threshold)
    }

    #[must_use]
    pub fn responses(&self) -> &[ExerciseResponse] {
        &self.responses
    }

    pub(crate) fn record(&mut self, response: ExerciseResponse) {
        self.responses.push(response);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
