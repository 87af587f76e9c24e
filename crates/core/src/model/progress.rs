use serde::{Deserialize, Deserializer, Serialize};

use crate::model::session::{SESSION_COUNT, SessionNumber};

/// Difficulty bounds shared by the adaptive controller and persisted progress.
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 5.0;

/// `current_session` value once every session has been passed.
pub const FINISHED_SESSION: u8 = SESSION_COUNT + 1;

/// Where a session stands for the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Completed,
    Current,
    Available,
    Locked,
}

impl SessionStatus {
    #[must_use]
    pub fn is_startable(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

/// Learner progress across the curriculum.
///
/// A single record exists per learner. Every mutation bumps `version`, so a
/// freshly loaded record can be told apart from a stale in-memory copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    current_session: u8,
    #[serde(deserialize_with = "valid_session_numbers")]
    completed_sessions: Vec<SessionNumber>,
    adaptive_difficulty: f64,
    last_practice_accuracy: f64,
    #[serde(default)]
    version: u64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current_session: SessionNumber::FIRST.value(),
            completed_sessions: Vec::new(),
            adaptive_difficulty: MIN_DIFFICULTY,
            last_practice_accuracy: 0.0,
            version: 0,
        }
    }
}

impl Progress {
    #[must_use]
    pub fn current_session(&self) -> u8 {
        self.current_session
    }

    #[must_use]
    pub fn completed_sessions(&self) -> &[SessionNumber] {
        &self.completed_sessions
    }

    #[must_use]
    pub fn adaptive_difficulty(&self) -> f64 {
        self.adaptive_difficulty
    }

    #[must_use]
    pub fn last_practice_accuracy(&self) -> f64 {
        self.last_practice_accuracy
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Store a new adaptive difficulty, clamped to `[1, 5]`.
    pub fn set_difficulty(&mut self, difficulty: f64) {
        self.adaptive_difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        self.bump();
    }

    /// Record the outcome of a finished practice round.
    pub fn record_practice(&mut self, accuracy: f64, difficulty: f64) {
        self.last_practice_accuracy = accuracy.clamp(0.0, 100.0);
        self.set_difficulty(difficulty);
    }

    /// Mark a session as passed and move the cursor past the highest passed session.
    pub fn record_pass(&mut self, session: SessionNumber) {
        self.completed_sessions.push(session);
        self.completed_sessions.sort_unstable();
        self.completed_sessions.dedup();

        let highest = self
            .completed_sessions
            .last()
            .map_or(0, |n| n.value());
        self.current_session = (highest + 1).min(FINISHED_SESSION);
        self.bump();
    }

    #[must_use]
    pub fn is_completed(&self, session: SessionNumber) -> bool {
        self.completed_sessions.contains(&session)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        SessionNumber::all().all(|n| self.is_completed(n))
    }

    #[must_use]
    pub fn status(&self, session: SessionNumber) -> SessionStatus {
        if self.is_completed(session) {
            SessionStatus::Completed
        } else if session.value() == self.current_session {
            SessionStatus::Current
        } else if session.value() > self.current_session {
            SessionStatus::Locked
        } else {
            SessionStatus::Available
        }
    }

    /// Status of every session in curriculum order.
    #[must_use]
    pub fn curriculum(&self) -> Vec<(SessionNumber, SessionStatus)> {
        SessionNumber::all().map(|n| (n, self.status(n))).collect()
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

fn valid_session_numbers<'de, D>(deserializer: D) -> Result<Vec<SessionNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<u8>::deserialize(deserializer)?;
    let mut numbers: Vec<SessionNumber> = raw
        .into_iter()
        .filter_map(|n| SessionNumber::new(n).ok())
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    Ok(numbers)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u8) -> SessionNumber {
        SessionNumber::new(v).unwrap()
    }

    #[test]
    fn defaults_match_first_visit() {
        let progress = Progress::default();
        assert_eq!(progress.current_session(), 1);
        assert!(progress.completed_sessions().is_empty());
        assert!((progress.adaptive_difficulty() - 1.0).abs() < f64::EPSILON);
        assert!(progress.last_practice_accuracy().abs() < f64::EPSILON);
    }

    #[test]
    fn passing_session_three_after_one_and_two() {
        let mut progress = Progress::default();
        progress.record_pass(n(1));
        progress.record_pass(n(2));
        progress.record_pass(n(3));

        assert_eq!(progress.completed_sessions(), &[n(1), n(2), n(3)]);
        assert_eq!(progress.current_session(), 4);
    }

    #[test]
    fn passes_are_deduplicated_sorted_and_capped() {
        let mut progress = Progress::default();
        for v in [5, 2, 2, 1, 3, 4] {
            progress.record_pass(n(v));
        }
        assert_eq!(progress.completed_sessions(), &[n(1), n(2), n(3), n(4), n(5)]);
        assert_eq!(progress.current_session(), FINISHED_SESSION);
        assert!(progress.is_finished());
    }

    #[test]
    fn every_mutation_bumps_version() {
        let mut progress = Progress::default();
        progress.set_difficulty(9.0);
        assert_eq!(progress.version(), 1);
        assert!((progress.adaptive_difficulty() - MAX_DIFFICULTY).abs() < f64::EPSILON);
        progress.record_practice(70.0, 2.5);
        progress.record_pass(n(1));
        assert_eq!(progress.version(), 3);
    }

    #[test]
    fn statuses_follow_cursor() {
        let mut progress = Progress::default();
        progress.record_pass(n(1));
        progress.record_pass(n(2));

        assert_eq!(progress.status(n(1)), SessionStatus::Completed);
        assert_eq!(progress.status(n(3)), SessionStatus::Current);
        assert_eq!(progress.status(n(4)), SessionStatus::Locked);
        assert!(!progress.status(n(5)).is_startable());
    }

    #[test]
    fn out_of_range_completed_sessions_are_dropped_on_load() {
        let json = r#"{
            "current_session": 3,
            "completed_sessions": [2, 0, 1, 7, 2],
            "adaptive_difficulty": 2.5,
            "last_practice_accuracy": 80.0
        }"#;
        let progress: Progress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.completed_sessions(), &[n(1), n(2)]);
        assert_eq!(progress.version(), 0);
    }
}
