/// Aggregated view of the active round, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub phase: &'static str,
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

/// Where the learner goes after a passed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Session(fraction_core::model::SessionNumber),
    FinalResults,
}
