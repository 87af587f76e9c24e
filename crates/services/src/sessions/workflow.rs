use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use fraction_core::adaptive::Adjustment;
use fraction_core::assessment::AssessmentOutcome;
use fraction_core::compare::Comparison;
use fraction_core::generator::ExerciseGenerator;
use fraction_core::model::{
    ErrorLog, ExerciseResponse, MIN_DIFFICULTY, Session, SessionId, SessionNumber,
    SubmissionDraft,
};
use fraction_core::phase::SessionPhase;
use fraction_core::settings::CurriculumSettings;
use storage::curriculum::CurriculumRepository;

use super::service::CurriculumSession;
use crate::Clock;
use crate::error::SessionError;

/// Result of answering a single exercise in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAnswerResult {
    pub response: ExerciseResponse,
    pub correct_answer: Comparison,
    /// Worked answer shown as feedback, e.g. `"3/4 < 5/6"`.
    pub solution: String,
    /// Difficulty step taken after this answer, practice only.
    pub adjustment: Option<Adjustment>,
    /// Set once the last assessment answer is scored.
    pub outcome: Option<AssessmentOutcome>,
    pub phase: SessionPhase,
}

/// Orchestrates a curriculum session against persisted progress.
///
/// Progress is never cached: it is re-read and written back at every phase
/// boundary, so an abandoned attempt leaves consistent state behind.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    settings: CurriculumSettings,
    repo: CurriculumRepository,
    seed: Option<u64>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, settings: CurriculumSettings, repo: CurriculumRepository) -> Self {
        Self {
            clock,
            settings,
            repo,
            seed: None,
        }
    }

    /// Derive every session's exercise stream from `seed` instead of the OS.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &CurriculumSettings {
        &self.settings
    }

    /// Start an attempt at the given session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Locked` if the session is not unlocked yet, or
    /// `SessionError::Storage` if progress cannot be read.
    pub async fn start_session(
        &self,
        number: SessionNumber,
    ) -> Result<CurriculumSession, SessionError> {
        let progress = self.repo.load_progress().await?;
        let status = progress.status(number);
        if !status.is_startable() {
            return Err(SessionError::Locked(number));
        }

        let now = self.clock.now();
        let record = Session::start(SessionId::random(), number, now);
        info!(session = %number, id = %record.id(), ?status, "session started");
        Ok(CurriculumSession::new(
            record,
            self.settings.clone(),
            self.generator_for(number),
            now,
        ))
    }

    /// Confirm the method being taught.
    ///
    /// After the last method the practice round starts at the persisted
    /// adaptive difficulty.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Phase` outside instruction,
    /// `SessionError::LessonIncomplete` before the lesson's last page, or
    /// `SessionError::Storage` if progress cannot be read.
    pub async fn acknowledge_method(
        &self,
        session: &mut CurriculumSession,
    ) -> Result<SessionPhase, SessionError> {
        let entering_practice = session
            .phase()
            .acknowledge_method()
            .is_ok_and(|next| next == SessionPhase::Practice);
        let start_difficulty = if entering_practice {
            self.repo.load_progress().await?.adaptive_difficulty()
        } else {
            MIN_DIFFICULTY
        };

        let phase = session.acknowledge(start_difficulty, self.clock.now())?;
        debug!(session = %session.number(), phase = phase.name(), "method acknowledged");
        if entering_practice {
            info!(
                session = %session.number(),
                difficulty = start_difficulty,
                "practice started"
            );
        }
        Ok(phase)
    }

    /// Score an answer to the current exercise and persist its effects.
    ///
    /// Wrong answers append an error log entry. Practice difficulty changes
    /// are written to progress as they happen. The last practice answer
    /// stores practice accuracy; the last assessment answer persists the
    /// finalized session and, on a pass, the updated progress.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongPhase` outside practice and assessment,
    /// `SessionError::Submission` for an incomplete draft (nothing is
    /// recorded), or `SessionError::Storage` for persistence failures.
    pub async fn submit_answer(
        &self,
        session: &mut CurriculumSession,
        draft: SubmissionDraft,
    ) -> Result<SessionAnswerResult, SessionError> {
        let now = self.clock.now();
        let (exercise, response) = session.score_current(draft, now)?;

        if let Some(entry) = ErrorLog::for_response(session.number(), &response, now) {
            debug!(
                session = %session.number(),
                exercise = %exercise.id(),
                error_type = %entry.error_type,
                "incorrect answer logged"
            );
            self.repo.append_error_log(entry).await?;
        }

        let mut adjustment = None;
        let mut outcome = None;
        match session.phase() {
            SessionPhase::Practice => {
                adjustment = session.record_practice(response.clone(), now)?;
                if let Some(step) = adjustment {
                    self.persist_difficulty(step).await?;
                }
                if session.practice_finished() {
                    self.complete_practice(session).await?;
                }
            }
            SessionPhase::Assessment => {
                session.record_assessment(response.clone(), now)?;
                if session.assessment_finished() {
                    outcome = Some(self.complete_assessment(session).await?);
                }
            }
            other => {
                return Err(SessionError::WrongPhase {
                    phase: other.name(),
                    action: "submit an answer",
                });
            }
        }

        Ok(SessionAnswerResult {
            response,
            correct_answer: exercise.correct_answer(),
            solution: exercise.solution(),
            adjustment,
            outcome,
            phase: session.phase(),
        })
    }

    /// Persist a finished round whose commit failed in `submit_answer`.
    ///
    /// Returns the assessment outcome when the assessment was committed, and
    /// `None` when practice was committed or nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if persisting fails again.
    pub async fn commit_finished_round(
        &self,
        session: &mut CurriculumSession,
    ) -> Result<Option<AssessmentOutcome>, SessionError> {
        match session.phase() {
            SessionPhase::Practice if session.practice_finished() => {
                self.complete_practice(session).await?;
                Ok(None)
            }
            SessionPhase::Assessment if session.assessment_finished() => {
                Ok(Some(self.complete_assessment(session).await?))
            }
            _ => Ok(None),
        }
    }

    /// Restart a failed attempt from the first method with a fresh record.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Phase` unless the session is awaiting a retry.
    pub fn retry(&self, session: &mut CurriculumSession) -> Result<(), SessionError> {
        let id = SessionId::random();
        session.retry(id, self.clock.now())?;
        info!(session = %session.number(), %id, "session retried");
        Ok(())
    }

    async fn persist_difficulty(&self, step: Adjustment) -> Result<(), SessionError> {
        let mut progress = self.repo.load_progress().await?;
        progress.set_difficulty(step.difficulty());
        self.repo.save_progress(&progress).await?;
        debug!(?step, "difficulty adjusted");
        Ok(())
    }

    async fn complete_practice(&self, session: &mut CurriculumSession) -> Result<(), SessionError> {
        let summary = session.practice_summary().ok_or(SessionError::NoExercise)?;

        let mut progress = self.repo.load_progress().await?;
        progress.record_practice(summary.accuracy, summary.difficulty);
        self.repo.save_progress(&progress).await?;

        session.finish_practice(self.clock.now())?;

        info!(
            session = %session.number(),
            accuracy = summary.accuracy,
            difficulty = summary.difficulty,
            "practice complete"
        );
        Ok(())
    }

    async fn complete_assessment(
        &self,
        session: &mut CurriculumSession,
    ) -> Result<AssessmentOutcome, SessionError> {
        let (outcome, record) = session.finalized_record(self.clock.now())?;
        self.repo.save_session(&record).await?;

        if outcome.passed {
            let mut progress = self.repo.load_progress().await?;
            progress.record_pass(session.number());
            self.repo.save_progress(&progress).await?;
        }

        session.finish_assessment(&outcome, record)?;

        info!(
            session = %session.number(),
            correct = outcome.correct,
            total = outcome.total,
            score = outcome.rounded_score(),
            passed = outcome.passed,
            "assessment scored"
        );
        Ok(outcome)
    }

    fn generator_for(&self, number: SessionNumber) -> ExerciseGenerator {
        let generator = match self.seed {
            Some(seed) => ExerciseGenerator::new(StdRng::seed_from_u64(
                seed.wrapping_add(u64::from(number.value())),
            )),
            None => ExerciseGenerator::from_os_rng(),
        };
        generator.with_max_attempts(self.settings.max_pair_attempts())
    }
}
