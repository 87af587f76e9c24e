mod progress;
mod rounds;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::{NextStep, SessionProgress};
pub use rounds::{AssessmentRound, PracticeRound};
pub use service::{CurriculumSession, PracticeSummary};
pub use workflow::{SessionAnswerResult, SessionLoopService};
