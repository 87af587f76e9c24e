//! Dashboard statistics derived from the full session history.
//!
//! Nothing here is stored; every figure is recomputed from `Session` records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Session, SessionNumber};

const MASTERY_SCORE: f64 = 90.0;
const ENGAGEMENT_MIN_MINUTES: f64 = 30.0;
const ENGAGEMENT_MAX_MINUTES: f64 = 60.0;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Success,
    Warning,
    Failure,
}

/// `value >= success` is a success, `value < failure` a failure, anything in
/// between a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricThresholds {
    pub success: f64,
    pub failure: f64,
}

pub const MASTERY_THRESHOLDS: MetricThresholds = MetricThresholds {
    success: 75.0,
    failure: 50.0,
};

pub const ERROR_REDUCTION_THRESHOLDS: MetricThresholds = MetricThresholds {
    success: 40.0,
    failure: 20.0,
};

pub const ENGAGEMENT_THRESHOLDS: MetricThresholds = MetricThresholds {
    success: 90.0,
    failure: 70.0,
};

impl MetricThresholds {
    #[must_use]
    pub fn classify(&self, value: f64) -> MetricStatus {
        if value >= self.success {
            MetricStatus::Success
        } else if value < self.failure {
            MetricStatus::Failure
        } else {
            MetricStatus::Warning
        }
    }
}

//
// ─── METRICS ───────────────────────────────────────────────────────────────────
//

/// The three headline percentages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub mastery_rate: f64,
    pub error_reduction: f64,
    pub engagement_efficiency: f64,
}

impl Metrics {
    #[must_use]
    pub fn from_sessions(sessions: &[Session]) -> Self {
        Self {
            mastery_rate: mastery_rate(sessions),
            error_reduction: error_reduction(sessions),
            engagement_efficiency: engagement_efficiency(sessions),
        }
    }

    #[must_use]
    pub fn mastery_status(&self) -> MetricStatus {
        MASTERY_THRESHOLDS.classify(self.mastery_rate)
    }

    #[must_use]
    pub fn error_reduction_status(&self) -> MetricStatus {
        ERROR_REDUCTION_THRESHOLDS.classify(self.error_reduction)
    }

    #[must_use]
    pub fn engagement_status(&self) -> MetricStatus {
        ENGAGEMENT_THRESHOLDS.classify(self.engagement_efficiency)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Share of scored session-5 attempts at or above the mastery score.
#[must_use]
pub fn mastery_rate(sessions: &[Session]) -> f64 {
    let finals: Vec<f64> = sessions
        .iter()
        .filter(|s| s.session_number() == SessionNumber::LAST)
        .filter_map(Session::quiz_score)
        .collect();
    let mastered = finals.iter().filter(|&&score| score >= MASTERY_SCORE).count();
    percentage(mastered, finals.len())
}

/// Error rate per session number. Later records of the same number win.
#[must_use]
pub fn error_rates(sessions: &[Session]) -> BTreeMap<SessionNumber, f64> {
    let mut rates = BTreeMap::new();
    for session in sessions.iter().filter(|s| !s.exercises().is_empty()) {
        let rate = percentage(session.incorrect_count(), session.exercises().len());
        rates.insert(session.session_number(), rate);
    }
    rates
}

/// Relative drop from the earliest to the latest session's error rate.
#[must_use]
pub fn error_reduction(sessions: &[Session]) -> f64 {
    let rates = error_rates(sessions);
    if rates.len() < 2 {
        return 0.0;
    }
    let (Some((_, &first)), Some((_, &last))) = (rates.first_key_value(), rates.last_key_value())
    else {
        return 0.0;
    };
    if first > 0.0 {
        (first - last) / first * 100.0
    } else {
        0.0
    }
}

/// Share of finished sessions lasting 30 to 60 minutes inclusive.
#[must_use]
pub fn engagement_efficiency(sessions: &[Session]) -> f64 {
    let durations: Vec<f64> = sessions
        .iter()
        .filter(|s| s.is_completed())
        .filter_map(Session::duration_minutes)
        .collect();
    let in_range = durations
        .iter()
        .filter(|&&m| (ENGAGEMENT_MIN_MINUTES..=ENGAGEMENT_MAX_MINUTES).contains(&m))
        .count();
    percentage(in_range, durations.len())
}

//
// ─── SESSION ROWS ──────────────────────────────────────────────────────────────
//

/// Per-attempt line of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRow {
    pub session_number: SessionNumber,
    pub duration_minutes: Option<i64>,
    pub accuracy: f64,
    pub quiz_score: Option<f64>,
    pub passed: bool,
}

impl SessionRow {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_number: session.session_number(),
            duration_minutes: session.duration().map(|d| d.num_minutes()),
            accuracy: session.accuracy(),
            quiz_score: session.quiz_score(),
            passed: session.quiz_passed().unwrap_or(false),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{Comparison, ComparisonMethod};
    use crate::fraction::Fraction;
    use crate::model::{Exercise, ExerciseId, ExerciseResponse, SessionId, SubmissionDraft};
    use crate::time::fixed_now;
    use chrono::Duration;
    use uuid::Uuid;

    fn responses(correct: usize, wrong: usize) -> Vec<ExerciseResponse> {
        let exercise = Exercise::new(
            ExerciseId::new(Uuid::nil()),
            Fraction::new(1, 3).unwrap(),
            Fraction::new(2, 3).unwrap(),
            ComparisonMethod::CrossMultiplication,
            1.0,
        );
        let answer = |c: Comparison| {
            let submission = SubmissionDraft::new(c, "because").validate().unwrap();
            ExerciseResponse::score(&exercise, submission, Duration::seconds(10))
        };
        let mut out: Vec<_> = (0..correct).map(|_| answer(Comparison::Less)).collect();
        out.extend((0..wrong).map(|_| answer(Comparison::Greater)));
        out
    }

    fn session(number: u8, minutes: i64, correct: usize, wrong: usize, score: f64) -> Session {
        let start = fixed_now();
        let mut s = Session::start(SessionId::random(), SessionNumber::new(number).unwrap(), start);
        s.extend_exercises(responses(correct, wrong));
        s.finalize(start + Duration::minutes(minutes), score, score >= 90.0)
            .unwrap();
        s
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(Metrics::from_sessions(&[]), Metrics::default());
    }

    #[test]
    fn mastery_counts_only_scored_final_sessions() {
        let sessions = vec![
            session(4, 40, 12, 0, 100.0),
            session(5, 40, 11, 1, 91.67),
            session(5, 40, 9, 3, 75.0),
        ];
        assert!((mastery_rate(&sessions) - 50.0).abs() < 1e-9);

        let unscored = Session::start(SessionId::random(), SessionNumber::LAST, fixed_now());
        assert!(mastery_rate(&[unscored]).abs() < f64::EPSILON);
    }

    #[test]
    fn error_reduction_compares_first_and_last_session() {
        // 50% errors in session 1, 10% in session 3
        let sessions = vec![session(3, 40, 9, 1, 90.0), session(1, 40, 5, 5, 50.0)];
        assert!((error_reduction(&sessions) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn error_reduction_needs_two_sessions_and_nonzero_start() {
        assert!(error_reduction(&[session(1, 40, 5, 5, 50.0)]).abs() < f64::EPSILON);
        let perfect_start = vec![session(1, 40, 10, 0, 100.0), session(2, 40, 5, 5, 50.0)];
        assert!(error_reduction(&perfect_start).abs() < f64::EPSILON);
    }

    #[test]
    fn later_attempt_of_same_session_wins() {
        let sessions = vec![
            session(1, 40, 5, 5, 50.0),
            session(2, 40, 0, 10, 0.0),
            session(2, 40, 10, 0, 100.0),
        ];
        assert!((error_reduction(&sessions) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn engagement_window_is_inclusive() {
        let sessions = vec![
            session(1, 30, 1, 0, 100.0),
            session(2, 60, 1, 0, 100.0),
            session(3, 61, 1, 0, 100.0),
            session(4, 10, 1, 0, 100.0),
        ];
        assert!((engagement_efficiency(&sessions) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn unfinished_sessions_do_not_count_for_engagement() {
        let open = Session::start(SessionId::random(), SessionNumber::FIRST, fixed_now());
        assert!(engagement_efficiency(&[open]).abs() < f64::EPSILON);
    }

    #[test]
    fn thresholds_classify_values() {
        assert_eq!(MASTERY_THRESHOLDS.classify(75.0), MetricStatus::Success);
        assert_eq!(MASTERY_THRESHOLDS.classify(60.0), MetricStatus::Warning);
        assert_eq!(MASTERY_THRESHOLDS.classify(49.9), MetricStatus::Failure);
        assert_eq!(ENGAGEMENT_THRESHOLDS.classify(90.0), MetricStatus::Success);
    }

    #[test]
    fn session_row_summarizes_attempt() {
        let row = SessionRow::from_session(&session(2, 45, 8, 2, 83.33));
        assert_eq!(row.duration_minutes, Some(45));
        assert!((row.accuracy - 80.0).abs() < 1e-9);
        assert!(!row.passed);
    }
}
