use chrono::{DateTime, Utc};
use std::fmt;

use fraction_core::adaptive::{AdaptiveController, Adjustment};
use fraction_core::assessment::AssessmentOutcome;
use fraction_core::generator::ExerciseGenerator;
use fraction_core::instruction::{LESSON_STEPS, Lesson, LessonCursor};
use fraction_core::model::{
    Exercise, ExerciseResponse, Session, SessionId, SessionNumber, SubmissionDraft,
};
use fraction_core::phase::SessionPhase;
use fraction_core::settings::CurriculumSettings;

use super::progress::{NextStep, SessionProgress};
use super::rounds::{AssessmentRound, PracticeRound};
use crate::error::SessionError;

/// Accuracy and difficulty reached at the end of practice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PracticeSummary {
    pub accuracy: f64,
    pub difficulty: f64,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory attempt at one curriculum session.
///
/// Steps through instruction, practice and assessment, collecting responses
/// into a `Session` record. Holds no storage handles; `SessionLoopService`
/// persists results at the phase boundaries.
pub struct CurriculumSession {
    number: SessionNumber,
    settings: CurriculumSettings,
    phase: SessionPhase,
    record: Session,
    lesson: LessonCursor,
    generator: ExerciseGenerator,
    practice: Option<PracticeRound>,
    assessment: Option<AssessmentRound>,
    presented_at: DateTime<Utc>,
}

impl CurriculumSession {
    /// `started_at` should come from the services layer clock to keep time deterministic.
    #[must_use]
    pub fn new(
        record: Session,
        settings: CurriculumSettings,
        generator: ExerciseGenerator,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            number: record.session_number(),
            settings,
            phase: SessionPhase::default(),
            record,
            lesson: LessonCursor::default(),
            generator,
            practice: None,
            assessment: None,
            presented_at: started_at,
        }
    }

    #[must_use]
    pub fn number(&self) -> SessionNumber {
        self.number
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The attempt's record as it will be persisted.
    #[must_use]
    pub fn record(&self) -> &Session {
        &self.record
    }

    #[must_use]
    pub fn settings(&self) -> &CurriculumSettings {
        &self.settings
    }

    /// Lesson for the method currently being taught.
    #[must_use]
    pub fn lesson(&self) -> Option<Lesson> {
        self.phase.current_method().map(Lesson::for_method)
    }

    #[must_use]
    pub fn lesson_cursor(&self) -> LessonCursor {
        self.lesson
    }

    /// Page forward inside the current lesson.
    pub fn next_lesson_step(&mut self) -> bool {
        self.lesson.next()
    }

    /// Page back inside the current lesson.
    pub fn previous_lesson_step(&mut self) -> bool {
        self.lesson.previous()
    }

    #[must_use]
    pub fn practice(&self) -> Option<&PracticeRound> {
        self.practice.as_ref()
    }

    #[must_use]
    pub fn assessment(&self) -> Option<&AssessmentRound> {
        self.assessment.as_ref()
    }

    /// Exercise waiting for an answer, if any.
    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        match self.phase {
            SessionPhase::Practice => self.practice.as_ref().and_then(PracticeRound::current),
            SessionPhase::Assessment => {
                self.assessment.as_ref().and_then(AssessmentRound::current)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let (total, answered) = match self.phase {
            SessionPhase::Practice => self
                .practice
                .as_ref()
                .map_or((0, 0), |round| (round.total(), round.answered())),
            SessionPhase::Assessment => self
                .assessment
                .as_ref()
                .map_or((0, 0), |round| (round.total(), round.answered())),
            SessionPhase::Instruction { method_index } => {
                (fraction_core::compare::ComparisonMethod::ALL.len(), method_index)
            }
            SessionPhase::Retry { .. } | SessionPhase::Complete { .. } => (0, 0),
        };
        SessionProgress {
            phase: self.phase.name(),
            total,
            answered,
            remaining: total.saturating_sub(answered),
        }
    }

    /// Where to go once this attempt is complete.
    #[must_use]
    pub fn next_step(&self) -> Option<NextStep> {
        if !self.phase.is_terminal() {
            return None;
        }
        Some(self.number.next().map_or(NextStep::FinalResults, NextStep::Session))
    }

    /// Acknowledge the current method; entering practice builds the round.
    ///
    /// The lesson must be on its last page.
    pub(crate) fn acknowledge(
        &mut self,
        start_difficulty: f64,
        now: DateTime<Utc>,
    ) -> Result<SessionPhase, SessionError> {
        let next = self.phase.acknowledge_method()?;
        if !self.lesson.is_last() {
            return Err(SessionError::LessonIncomplete {
                page: self.lesson.step() + 1,
                pages: LESSON_STEPS,
            });
        }
        if next == SessionPhase::Practice {
            let controller = AdaptiveController::from_settings(start_difficulty, &self.settings);
            self.practice = Some(PracticeRound::start(
                controller,
                self.settings.practice_exercises(),
                &mut self.generator,
            ));
            self.presented_at = now;
        }
        self.lesson = LessonCursor::default();
        self.phase = next;
        Ok(next)
    }

    /// Validate and score a submission for the current exercise.
    ///
    /// Nothing is recorded; a rejected draft leaves the exercise in place.
    pub(crate) fn score_current(
        &self,
        draft: SubmissionDraft,
        now: DateTime<Utc>,
    ) -> Result<(Exercise, ExerciseResponse), SessionError> {
        if !matches!(self.phase, SessionPhase::Practice | SessionPhase::Assessment) {
            return Err(SessionError::WrongPhase {
                phase: self.phase.name(),
                action: "submit an answer",
            });
        }
        let exercise = self.current_exercise().cloned().ok_or(SessionError::NoExercise)?;
        let submission = draft.validate()?;
        let response = ExerciseResponse::score(&exercise, submission, now - self.presented_at);
        Ok((exercise, response))
    }

    pub(crate) fn record_practice(
        &mut self,
        response: ExerciseResponse,
        now: DateTime<Utc>,
    ) -> Result<Option<Adjustment>, SessionError> {
        let Some(round) = self.practice.as_mut() else {
            return Err(SessionError::NoExercise);
        };
        self.presented_at = now;
        Ok(round.record(response, &mut self.generator))
    }

    #[must_use]
    pub(crate) fn practice_finished(&self) -> bool {
        self.practice.as_ref().is_some_and(PracticeRound::is_finished)
    }

    #[must_use]
    pub(crate) fn practice_summary(&self) -> Option<PracticeSummary> {
        self.practice.as_ref().map(|round| PracticeSummary {
            accuracy: round.accuracy(),
            difficulty: round.difficulty(),
        })
    }

    /// Close practice, move its responses into the record and build the assessment.
    pub(crate) fn finish_practice(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<PracticeSummary, SessionError> {
        let next = self.phase.finish_practice()?;
        let summary = self.practice_summary().ok_or(SessionError::NoExercise)?;
        let round = self.practice.take().ok_or(SessionError::NoExercise)?;
        self.record.extend_exercises(round.into_responses());
        self.assessment = Some(AssessmentRound::start(
            &mut self.generator,
            self.settings.assessment_exercises(),
        ));
        self.presented_at = now;
        self.phase = next;
        Ok(summary)
    }

    pub(crate) fn record_assessment(
        &mut self,
        response: ExerciseResponse,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let Some(round) = self.assessment.as_mut() else {
            return Err(SessionError::NoExercise);
        };
        round.record(response);
        self.presented_at = now;
        Ok(())
    }

    #[must_use]
    pub(crate) fn assessment_finished(&self) -> bool {
        self.assessment.as_ref().is_some_and(AssessmentRound::is_finished)
    }

    /// Score the assessment and build the finalized record.
    ///
    /// The attempt itself is untouched until `finish_assessment` adopts the
    /// record, so a failed save can be repeated.
    pub(crate) fn finalized_record(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(AssessmentOutcome, Session), SessionError> {
        let round = self.assessment.as_ref().ok_or(SessionError::NoExercise)?;
        let outcome = round.outcome(self.settings.mastery_threshold());
        self.phase.finish_assessment(&outcome)?;

        let mut record = self.record.clone();
        record.extend_exercises(round.responses().iter().cloned());
        record.finalize(now, outcome.score, outcome.passed)?;
        Ok((outcome, record))
    }

    /// Adopt the persisted record and leave the assessment.
    pub(crate) fn finish_assessment(
        &mut self,
        outcome: &AssessmentOutcome,
        record: Session,
    ) -> Result<(), SessionError> {
        let next = self.phase.finish_assessment(outcome)?;
        self.assessment = None;
        self.record = record;
        self.phase = next;
        Ok(())
    }

    /// Start over from the first method with a fresh record.
    pub(crate) fn retry(&mut self, id: SessionId, now: DateTime<Utc>) -> Result<(), SessionError> {
        let next = self.phase.retry()?;
        self.record = Session::start(id, self.number, now);
        self.practice = None;
        self.assessment = None;
        self.lesson = LessonCursor::default();
        self.presented_at = now;
        self.phase = next;
        Ok(())
    }
}

impl fmt::Debug for CurriculumSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurriculumSession")
            .field("number", &self.number)
            .field("phase", &self.phase)
            .field("record_id", &self.record.id())
            .field("responses_len", &self.record.exercises().len())
            .field("presented_at", &self.presented_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use fraction_core::compare::Comparison;
    use fraction_core::time::fixed_now;

    fn build_session() -> CurriculumSession {
        let record = Session::start(SessionId::random(), SessionNumber::FIRST, fixed_now());
        CurriculumSession::new(
            record,
            CurriculumSettings::default(),
            ExerciseGenerator::seeded(7),
            fixed_now(),
        )
    }

    fn skip_instruction(session: &mut CurriculumSession) {
        while session.phase().current_method().is_some() {
            while session.next_lesson_step() {}
            session.acknowledge(1.0, fixed_now()).unwrap();
        }
    }

    fn correct_draft(session: &CurriculumSession) -> SubmissionDraft {
        let answer = session.current_exercise().unwrap().correct_answer();
        SubmissionDraft::new(answer, "cross multiplied")
    }

    #[test]
    fn instruction_has_no_exercise() {
        let session = build_session();
        assert!(session.current_exercise().is_none());
        assert!(session.lesson().is_some());
        let err = session
            .score_current(SubmissionDraft::new(Comparison::Less, "x"), fixed_now())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::WrongPhase {
                phase: "instruction",
                ..
            }
        ));
    }

    #[test]
    fn method_needs_last_lesson_page() {
        let mut session = build_session();
        let err = session.acknowledge(1.0, fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::LessonIncomplete { page: 1, pages: 3 }
        ));
        assert_eq!(session.phase(), SessionPhase::Instruction { method_index: 0 });

        assert!(session.next_lesson_step());
        assert!(session.next_lesson_step());
        assert!(session.previous_lesson_step());
        assert!(session.acknowledge(1.0, fixed_now()).is_err());

        assert!(session.next_lesson_step());
        assert_eq!(
            session.acknowledge(1.0, fixed_now()).unwrap(),
            SessionPhase::Instruction { method_index: 1 }
        );
        assert_eq!(session.lesson_cursor().step(), 0);
    }

    #[test]
    fn entering_practice_presents_first_exercise() {
        let mut session = build_session();
        skip_instruction(&mut session);
        assert_eq!(session.phase(), SessionPhase::Practice);
        assert!(session.current_exercise().is_some());
        assert_eq!(session.progress().total, 10);
    }

    #[test]
    fn blank_justification_keeps_exercise() {
        let mut session = build_session();
        skip_instruction(&mut session);
        let before = session.current_exercise().unwrap().id();
        let mut draft = correct_draft(&session);
        draft.justification = "   ".into();

        let err = session.score_current(draft, fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Submission(_)));
        assert_eq!(session.current_exercise().unwrap().id(), before);
    }

    #[test]
    fn time_spent_is_measured_from_presentation() {
        let mut session = build_session();
        skip_instruction(&mut session);
        let later = fixed_now() + chrono::Duration::seconds(42);
        let (_, response) = session.score_current(correct_draft(&session), later).unwrap();
        assert_eq!(response.time_spent(), chrono::Duration::seconds(42));
    }

    #[test]
    fn practice_responses_move_into_record() {
        let mut session = build_session();
        skip_instruction(&mut session);
        while !session.practice_finished() {
            let (_, response) = session.score_current(correct_draft(&session), fixed_now()).unwrap();
            session.record_practice(response, fixed_now()).unwrap();
        }
        let summary = session.finish_practice(fixed_now()).unwrap();
        assert!((summary.accuracy - 100.0).abs() < 1e-9);
        assert_eq!(session.record().exercises().len(), 10);
        assert_eq!(session.phase(), SessionPhase::Assessment);
        assert_eq!(session.progress().total, 12);
    }

    #[test]
    fn finalized_record_leaves_attempt_open_until_adopted() {
        let mut session = build_session();
        skip_instruction(&mut session);
        while !session.practice_finished() {
            let (_, response) = session.score_current(correct_draft(&session), fixed_now()).unwrap();
            session.record_practice(response, fixed_now()).unwrap();
        }
        session.finish_practice(fixed_now()).unwrap();
        while !session.assessment_finished() {
            let (_, response) = session.score_current(correct_draft(&session), fixed_now()).unwrap();
            session.record_assessment(response, fixed_now()).unwrap();
        }

        let (outcome, record) = session.finalized_record(fixed_now()).unwrap();
        assert!(outcome.passed);
        assert_eq!(record.exercises().len(), 22);
        assert_eq!(session.phase(), SessionPhase::Assessment);
        assert!(!session.record().is_completed());

        session.finish_assessment(&outcome, record).unwrap();
        assert!(matches!(session.phase(), SessionPhase::Complete { .. }));
        assert!(session.record().is_completed());
    }

    #[test]
    fn next_step_only_after_completion() {
        let session = build_session();
        assert_eq!(session.next_step(), None);
    }
}
